use super::{
    AlivePayload, FrameParser, Header, HeaderedFrame, NoticePayload, Payload, WavePayload,
};
use crate::error::FrameError;
use crate::spec::FrameSpec;

/// Owned, stateful decode session for a single frame.
///
/// Unlike [`HeaderedFrame`], a session does not borrow anything, so it can be
/// stored in a struct or moved across threads. Payload decoders fail with
/// [`FrameError::HeaderNotDecoded`] until [`Session::header`] has succeeded.
///
/// ```rust
/// use inovibe_frame::frame::Session;
/// use inovibe_frame::FrameError;
///
/// let mut session = Session::new("030316641e009d520bc201040004000c6f").unwrap();
/// assert_eq!(session.notice().unwrap_err(), FrameError::HeaderNotDecoded);
///
/// session.header().unwrap();
/// assert!(session.notice().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    parser: FrameParser<'static>,
    header: Option<Header>,
}

impl Session {
    pub fn new(raw: &str) -> Result<Self, FrameError> {
        Ok(Self::from_parser(FrameParser::new(raw)?))
    }

    /// Session over a spec that lives for the whole program.
    pub fn with_spec(raw: &str, spec: &'static FrameSpec) -> Result<Self, FrameError> {
        Ok(Self::from_parser(FrameParser::with_spec(raw, spec)?))
    }

    pub fn from_parser(parser: FrameParser<'static>) -> Self {
        Self {
            parser,
            header: None,
        }
    }

    /// Decodes and caches the header. Later calls return the cached value.
    pub fn header(&mut self) -> Result<&Header, FrameError> {
        if self.header.is_none() {
            self.header = Some(self.parser.decode_header()?.into_header());
        }
        self.header.as_ref().ok_or(FrameError::HeaderNotDecoded)
    }

    /// The cached header, if decoded.
    pub fn cached_header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn alive(&self) -> Result<AlivePayload, FrameError> {
        self.headered()?.alive()
    }

    pub fn wave(&self) -> Result<WavePayload, FrameError> {
        self.headered()?.wave()
    }

    pub fn notice(&self) -> Result<NoticePayload, FrameError> {
        self.headered()?.notice()
    }

    pub fn payload(&self) -> Result<Payload, FrameError> {
        self.headered()?.payload()
    }

    pub fn parser(&self) -> &FrameParser<'static> {
        &self.parser
    }

    fn headered(&self) -> Result<HeaderedFrame<'_>, FrameError> {
        let header = self.header.clone().ok_or(FrameError::HeaderNotDecoded)?;
        Ok(HeaderedFrame {
            parser: &self.parser,
            header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PayloadType;

    const ALIVE: &str = "0302f411150092100064003bff07ffe3016801044c01000101010c0102060301020223";

    #[test]
    fn test_payload_before_header() {
        let session = Session::new(ALIVE).unwrap();
        assert!(session.cached_header().is_none());
        assert_eq!(session.alive(), Err(FrameError::HeaderNotDecoded));
        assert_eq!(session.wave(), Err(FrameError::HeaderNotDecoded));
        assert_eq!(session.notice(), Err(FrameError::HeaderNotDecoded));
        assert_eq!(session.payload(), Err(FrameError::HeaderNotDecoded));
    }

    #[test]
    fn test_header_then_payload() {
        let mut session = Session::new(ALIVE).unwrap();
        assert_eq!(session.header().unwrap().payload.kind, PayloadType::Alive);
        assert_eq!(session.alive().unwrap().alive_period, 360);
    }

    #[test]
    fn test_header_twice() {
        let mut session = Session::new(ALIVE).unwrap();
        let first = session.header().unwrap().clone();
        let second = session.header().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send + 'static>(_: &T) {}
        let session = Session::new(ALIVE).unwrap();
        assert_send(&session);
    }
}
