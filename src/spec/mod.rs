//! # Frame Spec Loader
//!
//! The frame layout is described by a declarative JSON document embedded at
//! build time (`frame_spec.json`). Each node is a leaf (`bits` + `signed`), a
//! composite (`fields`) or a dispatch field (`subtype`, a table from
//! discriminator value to the name of an alternative in the enclosing
//! node's `subtypes`).
//!
//! The document is resolved once into a closed [`FieldSpec`] tree, so the
//! walker never inspects untyped JSON while decoding.
//!
//! ```rust
//! use inovibe_frame::spec::FrameSpec;
//!
//! let spec = FrameSpec::embedded().unwrap();
//! assert_eq!(spec.header().fixed_bits(), Some(80));
//! assert!(spec.payload("notice").is_some());
//! ```

pub mod walker;

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::constants::{DEFAULT_DISCRIMINATOR, HEADER_BITS, MAX_NESTING_DEPTH};
use crate::error::SpecError;

pub use walker::{walk, FieldMap, FieldValue};

/// Embedded frame spec document
pub const FRAME_SPEC_JSON: &str = include_str!("frame_spec.json");

/// Top-level key of the header layout
pub const HEADER_KEY: &str = "header";

static EMBEDDED_SPEC: Lazy<Result<FrameSpec, SpecError>> =
    Lazy::new(|| FrameSpec::from_json(FRAME_SPEC_JSON));

/// A node of the document as written, before resolution.
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    bits: Option<u32>,
    #[serde(default)]
    signed: bool,
    #[serde(default)]
    fields: Option<Vec<RawNode>>,
    #[serde(default)]
    subtype: Option<BTreeMap<String, String>>,
    #[serde(default)]
    subtypes: BTreeMap<String, RawNode>,
    #[serde(default)]
    discriminator: Option<String>,
}

/// One resolved field of a frame layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Fixed-width integer.
    Leaf {
        name: String,
        bits: usize,
        signed: bool,
    },
    /// Ordered group of fields decoded into a nested map.
    Composite(CompositeSpec),
    /// Polymorphic field whose layout is selected by an earlier sibling.
    Dispatch {
        name: String,
        discriminator: String,
        alternatives: BTreeMap<u64, CompositeSpec>,
    },
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Leaf { name, .. } => name,
            FieldSpec::Composite(composite) => &composite.name,
            FieldSpec::Dispatch { name, .. } => name,
        }
    }

    /// Width in bits, when it does not depend on frame contents.
    pub fn fixed_bits(&self) -> Option<usize> {
        match self {
            FieldSpec::Leaf { bits, .. } => Some(*bits),
            FieldSpec::Composite(composite) => composite.fixed_bits(),
            FieldSpec::Dispatch { .. } => None,
        }
    }
}

/// An ordered list of fields: a payload layout, a nested group or a dispatch alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSpec {
    pub name: String,
    pub desc: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl CompositeSpec {
    /// Total width, or `None` if any field is dispatched.
    pub fn fixed_bits(&self) -> Option<usize> {
        self.fields.iter().map(FieldSpec::fixed_bits).sum()
    }

    /// Alternative selected by `value` in the first dispatch field of this composite.
    pub fn dispatch_alternative(&self, value: u64) -> Option<&CompositeSpec> {
        self.fields.iter().find_map(|field| match field {
            FieldSpec::Dispatch { alternatives, .. } => alternatives.get(&value),
            _ => None,
        })
    }
}

/// The resolved frame layout: a header plus one layout per payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    header: CompositeSpec,
    payloads: BTreeMap<String, CompositeSpec>,
}

impl FrameSpec {
    /// The spec compiled into the crate.
    ///
    /// Resolved on first use. An error here means the packaged document is
    /// broken, not that a frame is bad.
    pub fn embedded() -> Result<&'static FrameSpec, SpecError> {
        EMBEDDED_SPEC.as_ref().map_err(Clone::clone)
    }

    /// Parses and resolves a spec document.
    pub fn from_json(document: &str) -> Result<Self, SpecError> {
        let mut entries: BTreeMap<String, RawNode> =
            serde_json::from_str(document).map_err(|e| SpecError::Json(e.to_string()))?;

        let raw_header = entries
            .remove(HEADER_KEY)
            .ok_or_else(|| SpecError::MissingPayload(HEADER_KEY.to_string()))?;
        let header = resolve_composite(HEADER_KEY, &raw_header, 0)?;

        if header.fixed_bits() != Some(HEADER_BITS) {
            return Err(SpecError::InvalidNode {
                name: HEADER_KEY.to_string(),
                reason: format!(
                    "header must be exactly {HEADER_BITS} bits, got {:?}",
                    header.fixed_bits()
                ),
            });
        }

        let payloads = entries
            .iter()
            .map(|(key, raw)| Ok((key.clone(), resolve_composite(key, raw, 0)?)))
            .collect::<Result<BTreeMap<_, _>, SpecError>>()?;

        log::debug!(
            "Frame spec loaded: header + {} payload layouts ({:?})",
            payloads.len(),
            payloads.keys().collect::<Vec<_>>()
        );

        Ok(Self { header, payloads })
    }

    pub fn header(&self) -> &CompositeSpec {
        &self.header
    }

    /// Width of the header, which is also the bit offset where payloads start.
    pub fn header_bits(&self) -> usize {
        self.header.fixed_bits().unwrap_or(HEADER_BITS)
    }

    /// Payload layout for a payload-type key such as `"alive"`.
    pub fn payload(&self, key: &str) -> Option<&CompositeSpec> {
        self.payloads.get(key)
    }

    /// Keys of all payload layouts, in sorted order.
    pub fn payload_keys(&self) -> impl Iterator<Item = &str> {
        self.payloads.keys().map(String::as_str)
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> SpecError {
    SpecError::InvalidNode {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn resolve_composite(name: &str, node: &RawNode, depth: usize) -> Result<CompositeSpec, SpecError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SpecError::NestingTooDeep {
            field: name.to_string(),
            limit: MAX_NESTING_DEPTH,
        });
    }

    let raw_fields = node
        .fields
        .as_ref()
        .ok_or_else(|| invalid(name, "composite without `fields`"))?;

    let mut seen = HashSet::new();
    let mut fields: Vec<FieldSpec> = Vec::with_capacity(raw_fields.len());
    for raw in raw_fields {
        if raw.name.is_empty() {
            return Err(invalid(name, "field without a name"));
        }
        if !seen.insert(raw.name.as_str()) {
            return Err(invalid(&raw.name, format!("duplicate field in {name:?}")));
        }
        let field = resolve_field(raw, &node.subtypes, depth)?;

        // The discriminator must already be decoded when the walker reaches the dispatch.
        if let FieldSpec::Dispatch { discriminator, .. } = &field {
            let decoded_before = fields.iter().any(|earlier| {
                matches!(earlier, FieldSpec::Leaf { name, .. } if name == discriminator)
            });
            if !decoded_before {
                return Err(invalid(
                    &raw.name,
                    format!("discriminator {discriminator:?} is not a preceding leaf"),
                ));
            }
        }
        fields.push(field);
    }

    let composite = CompositeSpec {
        name: name.to_string(),
        desc: node.desc.clone(),
        fields,
    };

    // A declared width on a composite documents the sum of its children.
    if let Some(declared) = node.bits {
        if composite.fixed_bits() != Some(declared as usize) {
            return Err(invalid(
                name,
                format!(
                    "declared {declared} bits but fields sum to {:?}",
                    composite.fixed_bits()
                ),
            ));
        }
    }

    Ok(composite)
}

fn resolve_field(
    node: &RawNode,
    subtypes: &BTreeMap<String, RawNode>,
    depth: usize,
) -> Result<FieldSpec, SpecError> {
    match (&node.fields, &node.subtype) {
        (Some(_), Some(_)) => Err(invalid(&node.name, "both `fields` and `subtype`")),
        (Some(_), None) => Ok(FieldSpec::Composite(resolve_composite(
            &node.name,
            node,
            depth + 1,
        )?)),
        (None, Some(table)) => {
            if node.bits.is_some() {
                return Err(invalid(&node.name, "dispatch field with `bits`"));
            }

            let mut alternatives = BTreeMap::new();
            for (key, subtype_name) in table {
                let value = key
                    .parse::<u64>()
                    .map_err(|_| SpecError::InvalidDiscriminatorKey {
                        field: node.name.clone(),
                        key: key.clone(),
                    })?;
                let raw = subtypes
                    .get(subtype_name)
                    .ok_or_else(|| SpecError::UnknownSubtype {
                        field: node.name.clone(),
                        subtype: subtype_name.clone(),
                    })?;
                alternatives.insert(value, resolve_composite(subtype_name, raw, depth + 1)?);
            }

            Ok(FieldSpec::Dispatch {
                name: node.name.clone(),
                discriminator: node
                    .discriminator
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DISCRIMINATOR.to_string()),
                alternatives,
            })
        }
        (None, None) => match node.bits {
            Some(bits @ 1..=64) => Ok(FieldSpec::Leaf {
                name: node.name.clone(),
                bits: bits as usize,
                signed: node.signed,
            }),
            Some(bits) => Err(SpecError::InvalidWidth {
                field: node.name.clone(),
                bits,
            }),
            None => Err(invalid(&node.name, "no `bits`, `fields` or `subtype`")),
        },
    }
}
