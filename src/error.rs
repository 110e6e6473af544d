use core::fmt;
use std::time::SystemTimeError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type
#[derive(Debug)]
pub enum Error {
    /// The shared secret is not valid unpadded Base32
    InvalidSecretEncoding,
    /// The supplied code does not have the expected length (carries the actual length in bytes)
    InvalidCodeLength(usize),
    /// The configured OTP type is neither `totp` nor `hotp`
    UnsupportedAlgorithmType(String),
    /// The operating system random source could not be read
    RandomSourceFailure(BoxError),
    /// System time is set to before the Unix epoch
    SystemTime(SystemTimeError),
    /// Configuration could not be read or parsed
    Config(BoxError),
    /// A counter or used-code store failed
    Store(BoxError),
    /// QR code or PNG encoding failed
    QrEncode(String),
}

impl Error {
    /// Wraps any storage backend failure
    pub fn store<E>(e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Store(e.into())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SystemTime(e) => Some(e),
            Self::RandomSourceFailure(e) | Self::Config(e) | Self::Store(e) => Some(e.as_ref()),
            Self::InvalidSecretEncoding
            | Self::InvalidCodeLength(_)
            | Self::UnsupportedAlgorithmType(_)
            | Self::QrEncode(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSecretEncoding => {
                write!(f, "Invalid secret key format or Base32 decoding failed")
            }
            Self::InvalidCodeLength(len) => write!(
                f,
                "Invalid code length: {len} bytes, expected {}",
                crate::CODE_LENGTH
            ),
            Self::UnsupportedAlgorithmType(kind) => write!(
                f,
                "Unsupported otp type {kind:?}. Should be either totp or hotp"
            ),
            Self::RandomSourceFailure(e) => write!(f, "Failed to read random bytes: {e}"),
            Self::SystemTime(e) => write!(
                f,
                "System time error: {e}. The system time is set before the Unix epoch (1970-01-01 00:00:00 UTC)"
            ),
            Self::Config(e) => write!(f, "Failed to load config: {e}"),
            Self::Store(e) => write!(f, "Storage error: {e}"),
            Self::QrEncode(e) => write!(f, "Failed to encode QR code: {e}"),
        }
    }
}

impl From<SystemTimeError> for Error {
    fn from(e: SystemTimeError) -> Self {
        Self::SystemTime(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_mentions_the_offending_value() {
        let e = Error::UnsupportedAlgorithmType("motp".to_owned());
        assert!(e.to_string().contains("\"motp\""));

        let e = Error::InvalidCodeLength(5);
        assert_eq!(e.to_string(), "Invalid code length: 5 bytes, expected 6");
    }

    #[test]
    fn store_errors_keep_their_source() {
        let e = Error::store("disk full");
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "Storage error: disk full");
    }
}
