use std::{error, fmt};

use wire;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Wire(wire::Error),
    Crypto(String),
    NoAvailableSignatureSchemes,
    CertificateVerifyNoCertificate,
    VerifyDataMismatch,
    ClientCertificateRequired,
    ClientCertificateNotVerified,
    CookieMismatch,
    CipherSuiteUnset,
    InvalidCipherSuite(u16),
    CipherSuiteNoIntersection,
    NoSupportedEllipticCurves,
    NoMatchingSrtpProfile,
    UnsupportedProtocolVersion,
    ServerRequiredButNoClientEms,
    ClientRequiredButNoServerEms,
    PskCallbackUnset,
    KeypairUnset,
    NoCertificates,
    InvalidContentType,
    KeyExchangeMismatch,
    FragmentBufferOverflow { new_size: usize, max_size: usize },
    ContextCancelled,
}

impl error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match self {
            &Error::Wire(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<wire::Error> for Error {
    fn from(e: wire::Error) -> Self {
        Error::Wire(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;

        match self {
            &Wire(ref e) => write!(f, "wire error: {}", e),
            &Crypto(ref msg) => write!(f, "crypto error: {}", msg),
            &NoAvailableSignatureSchemes => {
                write!(f, "connection can not be created, no SignatureScheme satisfy this Config")
            }
            &CertificateVerifyNoCertificate => {
                write!(f, "client sent certificate verify but we have no certificate to verify")
            }
            &VerifyDataMismatch => write!(f, "expected and actual verify data does not match"),
            &ClientCertificateRequired => {
                write!(f, "client is required to report a certificate but none was given")
            }
            &ClientCertificateNotVerified => {
                write!(f, "client sent certificate but did not verify it")
            }
            &CookieMismatch => write!(f, "client+server cookie does not match"),
            &CipherSuiteUnset => {
                write!(f, "server hello can not be created without a cipher suite")
            }
            &InvalidCipherSuite(id) => write!(f, "invalid or unknown cipher suite: 0x{:04x}", id),
            &CipherSuiteNoIntersection => {
                write!(f, "client+server do not support any shared cipher suites")
            }
            &NoSupportedEllipticCurves => {
                write!(f, "client requested zero or more elliptic curves that are not supported by the server")
            }
            &NoMatchingSrtpProfile => {
                write!(f, "client+server do not support any shared SRTP protection profiles")
            }
            &UnsupportedProtocolVersion => write!(f, "unsupported protocol version"),
            &ServerRequiredButNoClientEms => {
                write!(f, "server requires the extended master secret extension but the client does not support it")
            }
            &ClientRequiredButNoServerEms => {
                write!(f, "client requires the extended master secret extension but the server does not support it")
            }
            &PskCallbackUnset => write!(f, "PSK callback is required for a PSK cipher suite"),
            &KeypairUnset => write!(f, "local keypair is required but unset"),
            &NoCertificates => write!(f, "no certificates configured"),
            &InvalidContentType => write!(f, "invalid content type"),
            &KeyExchangeMismatch => {
                write!(f, "key exchange form does not match the negotiated cipher suite")
            }
            &FragmentBufferOverflow { new_size, max_size } => write!(
                f,
                "fragment buffer overflow: new size {} exceeds max size {}",
                new_size, max_size
            ),
            &ContextCancelled => write!(f, "context cancelled"),
        }
    }
}
