use std::fmt;

use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Fatal,
}

impl AlertLevel {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        match v {
            1 => Ok(AlertLevel::Warning),
            2 => Ok(AlertLevel::Fatal),
            _ => Err(Error::InvalidAlert),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match *self {
            AlertLevel::Warning => 1,
            AlertLevel::Fatal => 2,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AlertLevel::Warning => write!(f, "LevelWarning"),
            AlertLevel::Fatal => write!(f, "LevelFatal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDescription {
    CloseNotify,
    UnexpectedMessage,
    BadRecordMac,
    RecordOverflow,
    DecompressionFailure,
    HandshakeFailure,
    NoCertificate,
    BadCertificate,
    UnsupportedCertificate,
    CertificateRevoked,
    CertificateExpired,
    CertificateUnknown,
    IllegalParameter,
    UnknownCa,
    AccessDenied,
    DecodeError,
    DecryptError,
    ProtocolVersion,
    InsufficientSecurity,
    InternalError,
    UserCanceled,
    NoRenegotiation,
    UnsupportedExtension,
}

impl AlertDescription {
    pub fn from_u8(v: u8) -> Result<Self, Error> {
        use self::AlertDescription::*;

        match v {
            0 => Ok(CloseNotify),
            10 => Ok(UnexpectedMessage),
            20 => Ok(BadRecordMac),
            22 => Ok(RecordOverflow),
            30 => Ok(DecompressionFailure),
            40 => Ok(HandshakeFailure),
            41 => Ok(NoCertificate),
            42 => Ok(BadCertificate),
            43 => Ok(UnsupportedCertificate),
            44 => Ok(CertificateRevoked),
            45 => Ok(CertificateExpired),
            46 => Ok(CertificateUnknown),
            47 => Ok(IllegalParameter),
            48 => Ok(UnknownCa),
            49 => Ok(AccessDenied),
            50 => Ok(DecodeError),
            51 => Ok(DecryptError),
            70 => Ok(ProtocolVersion),
            71 => Ok(InsufficientSecurity),
            80 => Ok(InternalError),
            90 => Ok(UserCanceled),
            100 => Ok(NoRenegotiation),
            110 => Ok(UnsupportedExtension),
            _ => Err(Error::InvalidAlert),
        }
    }

    pub fn as_u8(&self) -> u8 {
        use self::AlertDescription::*;

        match *self {
            CloseNotify => 0,
            UnexpectedMessage => 10,
            BadRecordMac => 20,
            RecordOverflow => 22,
            DecompressionFailure => 30,
            HandshakeFailure => 40,
            NoCertificate => 41,
            BadCertificate => 42,
            UnsupportedCertificate => 43,
            CertificateRevoked => 44,
            CertificateExpired => 45,
            CertificateUnknown => 46,
            IllegalParameter => 47,
            UnknownCa => 48,
            AccessDenied => 49,
            DecodeError => 50,
            DecryptError => 51,
            ProtocolVersion => 70,
            InsufficientSecurity => 71,
            InternalError => 80,
            UserCanceled => 90,
            NoRenegotiation => 100,
            UnsupportedExtension => 110,
        }
    }
}

impl fmt::Display for AlertDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::AlertDescription::*;

        match *self {
            CloseNotify => write!(f, "CloseNotify"),
            UnexpectedMessage => write!(f, "UnexpectedMessage"),
            BadRecordMac => write!(f, "BadRecordMac"),
            RecordOverflow => write!(f, "RecordOverflow"),
            DecompressionFailure => write!(f, "DecompressionFailure"),
            HandshakeFailure => write!(f, "HandshakeFailure"),
            NoCertificate => write!(f, "NoCertificate"),
            BadCertificate => write!(f, "BadCertificate"),
            UnsupportedCertificate => write!(f, "UnsupportedCertificate"),
            CertificateRevoked => write!(f, "CertificateRevoked"),
            CertificateExpired => write!(f, "CertificateExpired"),
            CertificateUnknown => write!(f, "CertificateUnknown"),
            IllegalParameter => write!(f, "IllegalParameter"),
            UnknownCa => write!(f, "UnknownCA"),
            AccessDenied => write!(f, "AccessDenied"),
            DecodeError => write!(f, "DecodeError"),
            DecryptError => write!(f, "DecryptError"),
            ProtocolVersion => write!(f, "ProtocolVersion"),
            InsufficientSecurity => write!(f, "InsufficientSecurity"),
            InternalError => write!(f, "InternalError"),
            UserCanceled => write!(f, "UserCanceled"),
            NoRenegotiation => write!(f, "NoRenegotiation"),
            UnsupportedExtension => write!(f, "UnsupportedExtension"),
        }
    }
}

/// One of the content types supported by the TLS record layer. Alert
/// messages convey the severity of the message and a description of the
/// alert. Alert messages with a level of fatal result in the immediate
/// termination of the connection.
/// https://tools.ietf.org/html/rfc5246#section-7.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub alert_level: AlertLevel,
    pub alert_description: AlertDescription,
}

impl Alert {
    pub fn marshal(&self) -> Vec<u8> {
        vec![self.alert_level.as_u8(), self.alert_description.as_u8()]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 2 {
            return Err(Error::BufferTooSmall);
        }

        Ok(Alert {
            alert_level: AlertLevel::from_u8(data[0])?,
            alert_description: AlertDescription::from_u8(data[1])?,
        })
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Alert {}: {}", self.alert_level, self.alert_description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_round_trip() {
        let a = Alert {
            alert_level: AlertLevel::Fatal,
            alert_description: AlertDescription::HandshakeFailure,
        };

        let raw = a.marshal();
        assert_eq!(raw, vec![2, 40]);
        assert_eq!(Alert::unmarshal(&raw).unwrap(), a);
    }

    #[test]
    fn alert_unknown_description() {
        assert_eq!(Alert::unmarshal(&[1, 254]), Err(Error::InvalidAlert));
    }
}
