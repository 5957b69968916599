use error::Error;

/// The Finished message is the first one protected with the just
/// negotiated algorithms, keys, and secrets. The verify data proves both
/// sides agree on the handshake transcript.
/// https://tools.ietf.org/html/rfc5246#section-7.4.9
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finished {
    pub verify_data: Vec<u8>,
}

impl Finished {
    pub fn marshal(&self) -> Result<Vec<u8>, Error> {
        Ok(self.verify_data.clone())
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        Ok(Finished {
            verify_data: data.to_vec(),
        })
    }
}
