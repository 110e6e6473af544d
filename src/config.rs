//! YAML configuration for the OTP credential
//!
//! Only the `cred` section of the application config is read, other keys are
//! ignored:
//!
//! ```yaml
//! cred:
//!   secret: JBSWY3DPEHPK3PXP
//!   type: totp    # totp | hotp, case-insensitive
//!   window: 1     # optional
//!   counter: 1    # optional, HOTP start counter
//! ```

use crate::{DEFAULT_HOTP_COUNTER, DEFAULT_WINDOW, Error, Otp};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "app.yaml";

/// Algorithm family selected by the `type` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpKind {
    /// Time-based, RFC 6238
    Totp,
    /// Counter-based, RFC 4226
    Hotp,
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totp => write!(f, "totp"),
            Self::Hotp => write!(f, "hotp"),
        }
    }
}

impl FromStr for OtpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "totp" => Ok(Self::Totp),
            "hotp" => Ok(Self::Hotp),
            _ => Err(Error::UnsupportedAlgorithmType(s.to_owned())),
        }
    }
}

/// The `cred` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Base32 shared secret
    pub secret: String,
    /// `totp` or `hotp`, validated when the engine is built
    #[serde(rename = "type")]
    pub kind: String,
    /// Resynchronization window, 0 disables it
    #[serde(default = "default_window")]
    pub window: u32,
    /// Counter used for HOTP until a stored one exists
    #[serde(default = "default_counter")]
    pub counter: u64,
}

const fn default_window() -> u32 {
    DEFAULT_WINDOW
}

const fn default_counter() -> u64 {
    DEFAULT_HOTP_COUNTER
}

impl OtpConfig {
    /// Config with the default window and HOTP start counter
    pub fn new<S: Into<String>>(secret: S, kind: OtpKind) -> Self {
        Self {
            secret: secret.into(),
            kind: kind.to_string(),
            window: DEFAULT_WINDOW,
            counter: DEFAULT_HOTP_COUNTER,
        }
    }

    /// Configure the resynchronization window
    #[must_use]
    pub const fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Configure the HOTP start counter
    #[must_use]
    pub const fn with_counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    /// Parsed `type`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithmType`] unless the type is `totp` or `hotp`
    pub fn kind(&self) -> Result<OtpKind, Error> {
        self.kind.parse()
    }

    /// Build a fresh engine from this configuration
    ///
    /// The secret is not decoded here, a bad secret surfaces on first use
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithmType`] unless the type is `totp` or `hotp`
    pub fn build(&self) -> Result<Otp, Error> {
        let otp = match self.kind()? {
            OtpKind::Totp => Otp::totp(self.secret.as_str()),
            OtpKind::Hotp => Otp::hotp_at(self.secret.as_str(), self.counter),
        };

        Ok(otp.with_window(self.window))
    }
}

/// Application config as far as this crate is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// OTP credential
    pub cred: OtpConfig,
}

impl Config {
    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the YAML is malformed or `cred` is missing
    pub fn from_yaml_str(s: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Read and parse a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| Error::Config(Box::new(e)))?;
        tracing::debug!(path = %path.display(), "loaded otp config");
        Self::from_yaml_str(&data)
    }
}
