//! # Recursive Field Walker
//!
//! Walks a resolved [`CompositeSpec`] against a [`BitBuffer`], consuming one
//! field after another in declared order.
//!
//! - Leaves are read at the current offset and sign-extended when signed.
//! - Composites recurse and are stored as a nested [`FieldMap`].
//! - Dispatch fields look up the already-decoded discriminator, recurse into
//!   the selected alternative and merge its fields into the current map.
//!
//! The walk returns the map together with the bit offset after the last
//! consumed field, so callers can continue reading past it (wave samples).

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{CompositeSpec, FieldSpec};
use crate::constants::MAX_NESTING_DEPTH;
use crate::error::{FrameError, SpecError};
use crate::util::bits::BitBuffer;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Nested(FieldMap),
}

impl FieldValue {
    /// Integer view of a leaf value.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            FieldValue::Unsigned(v) => Some(i128::from(*v)),
            FieldValue::Signed(v) => Some(i128::from(*v)),
            FieldValue::Nested(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Unsigned(v) => serializer.serialize_u64(*v),
            FieldValue::Signed(v) => serializer.serialize_i64(*v),
            FieldValue::Nested(map) => map.serialize(serializer),
        }
    }
}

/// Field name to value, in decode order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing an earlier one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a leaf as the integer type of a typed record field.
    ///
    /// Fails with `MissingField` if the name is absent or not a leaf, and
    /// `FieldOverflow` if the value does not fit `T`.
    pub fn value<T: TryFrom<i128>>(&self, name: &str) -> Result<T, SpecError> {
        let raw = self
            .get(name)
            .and_then(FieldValue::as_integer)
            .ok_or_else(|| SpecError::MissingField(name.to_string()))?;

        T::try_from(raw).map_err(|_| SpecError::FieldOverflow {
            field: name.to_string(),
            value: raw,
        })
    }

    /// Nested map of a composite field.
    pub fn nested(&self, name: &str) -> Result<&FieldMap, SpecError> {
        match self.get(name) {
            Some(FieldValue::Nested(map)) => Ok(map),
            _ => Err(SpecError::MissingField(name.to_string())),
        }
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Walks `spec` starting at bit `start`, returning the fields and the end offset.
pub fn walk(
    spec: &CompositeSpec,
    buffer: &BitBuffer,
    start: usize,
) -> Result<(FieldMap, usize), FrameError> {
    let mut map = FieldMap::new();
    let end = walk_fields(&spec.fields, &spec.name, buffer, start, 0, &mut map)?;
    Ok((map, end))
}

fn walk_fields(
    fields: &[FieldSpec],
    parent: &str,
    buffer: &BitBuffer,
    mut offset: usize,
    depth: usize,
    map: &mut FieldMap,
) -> Result<usize, FrameError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SpecError::NestingTooDeep {
            field: parent.to_string(),
            limit: MAX_NESTING_DEPTH,
        }
        .into());
    }

    for field in fields {
        match field {
            FieldSpec::Leaf { name, bits, signed } => {
                let value = if *signed {
                    FieldValue::Signed(buffer.read_signed(offset, *bits)?)
                } else {
                    FieldValue::Unsigned(buffer.read_unsigned(offset, *bits)?)
                };
                map.insert(name.as_str(), value);
                offset += bits;
            }
            FieldSpec::Composite(composite) => {
                let mut nested = FieldMap::new();
                offset = walk_fields(
                    &composite.fields,
                    &composite.name,
                    buffer,
                    offset,
                    depth + 1,
                    &mut nested,
                )?;
                map.insert(composite.name.as_str(), FieldValue::Nested(nested));
            }
            FieldSpec::Dispatch {
                name,
                discriminator,
                alternatives,
            } => {
                let value = match map.get(discriminator) {
                    Some(FieldValue::Unsigned(v)) => *v,
                    Some(FieldValue::Signed(v)) => *v as u64,
                    _ => return Err(SpecError::MissingField(discriminator.clone()).into()),
                };

                let alternative =
                    alternatives
                        .get(&value)
                        .ok_or_else(|| FrameError::UnknownDiscriminator {
                            field: discriminator.clone(),
                            value,
                        })?;

                log::debug!(
                    "Dispatch {parent}.{name}: {discriminator}={value} -> {}",
                    alternative.name
                );

                offset = walk_fields(
                    &alternative.fields,
                    &alternative.name,
                    buffer,
                    offset,
                    depth + 1,
                    map,
                )?;
            }
        }
    }

    Ok(offset)
}
