use error::Error;

/// The ServerHelloDone indicates the end of the ServerHello and associated
/// messages. Its body is empty.
/// https://tools.ietf.org/html/rfc5246#section-7.4.5
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerHelloDone {}

impl ServerHelloDone {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    pub fn unmarshal(_data: &[u8]) -> Result<Self, Error> {
        Ok(ServerHelloDone {})
    }
}
