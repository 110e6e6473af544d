//! RFC 4226 & RFC 6238 one-time password engine for a single-admin backend
//!
//! - **TOTP / HOTP**: One engine, two modes, chosen once at construction
//! - **Resynchronization**: Backward/forward time window (TOTP) or look-ahead counter window (HOTP)
//! - **Provisioning**: `otpauth://` URI and optional QR PNG (`qr` feature)
//! - **Replay guard**: [`Authenticator`] remembers the last accepted code and persists HOTP counters
//!
//! # Examples
//!
//! ```
//! use snsotp::{Otp, create_code, time_interval};
//!
//! let now = 1_700_000_000;
//! let code = create_code("JBSWY3DPEHPK3PXP", time_interval(now)).unwrap();
//!
//! let mut totp = Otp::totp("JBSWY3DPEHPK3PXP");
//! assert!(totp.verify_code_at(&code, now).unwrap());
//! assert!(totp.create_uri().starts_with("otpauth://totp/"));
//! ```
//!
//! HOTP counters advance on every verification:
//!
//! ```
//! use snsotp::Otp;
//!
//! let mut hotp = Otp::hotp_at("JBSWY3DPEHPK3PXP", 10).with_window(2);
//! let code = hotp.clone().create_hotp_code(12).unwrap();
//!
//! assert!(hotp.verify_code(&code).unwrap());
//! assert_eq!(hotp.counter(), Some(13));
//! ```

mod error;
mod secret;

pub mod auth;
pub mod config;
#[cfg(feature = "qr")]
pub mod qr;
pub mod store;

pub use auth::Authenticator;
pub use config::{Config, OtpConfig, OtpKind};
pub use error::Error;
pub use secret::{SECRET_CHARS, SECRET_LENGTH, new_secret};

use core::fmt;
use data_encoding::{Encoding, Specification, SpecificationError};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// Number of digits in every generated code
pub const CODE_LENGTH: usize = 6;
/// TOTP time step in seconds
pub const PERIOD: u64 = 30;
/// Display name of the service provider shown in authenticator apps
pub const ISSUER: &str = "SNS Backend";
/// Single-admin system, so the account is a fixed placeholder
pub const ACCOUNT: &str = "admin";
/// Resynchronization window used when nothing else is configured
pub const DEFAULT_WINDOW: u32 = 1;
/// First HOTP counter handed out by [`Otp::hotp`]
pub const DEFAULT_HOTP_COUNTER: u64 = 1;

const MODULUS: u32 = 1_000_000;

type HmacSha1 = Hmac<Sha1>;

/// Unpadded RFC 4648 Base32 that, like most authenticator apps, ignores the
/// unused low bits of the last character
static BASE32_LENIENT: LazyLock<Result<Encoding, SpecificationError>> = LazyLock::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567");
    spec.check_trailing_bits = false;
    spec.encoding()
});

/// Which RFC the instance follows, and the HOTP moving factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// RFC 6238, the moving factor is `floor(unix_time / 30)`
    Totp,
    /// RFC 4226, the moving factor is an explicit counter
    Hotp {
        /// Next counter value the server expects
        counter: u64,
    },
}

impl Mode {
    /// URI scheme host: `totp` or `hotp`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::Hotp { .. } => "hotp",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded shared secret
///
/// Memory is zeroed on drop when the `zeroize` feature is enabled
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct SecretKey(Box<[u8]>);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl SecretKey {
    /// Decodes a Base32 encoded shared secret
    ///
    /// RFC 4648 alphabet, upper case, no padding. Non-zero trailing bits in
    /// the last character are accepted and dropped
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSecretEncoding`] if the input is not valid unpadded Base32
    pub fn from_base32<S: AsRef<str>>(secret: S) -> Result<Self, Error> {
        let decoded = BASE32_LENIENT
            .as_ref()
            .map_err(|_| Error::InvalidSecretEncoding)?
            .decode(secret.as_ref().as_bytes())
            .map_err(|_| Error::InvalidSecretEncoding)?;

        Ok(Self(decoded.into_boxed_slice()))
    }

    /// Reference to the shared secret byte array
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes in the key
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the key is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keyed HMAC-SHA1 state, cloned once per candidate code
    fn mac(&self) -> Result<HmacSha1, Error> {
        // HMAC accepts keys of any length, this only fails on a broken backend
        HmacSha1::new_from_slice(&self.0).map_err(|_| Error::InvalidSecretEncoding)
    }
}

/// One configured passcode generator/verifier bound to a single shared secret
///
/// Cheap to build; the usual pattern is one instance per request, rebuilt from
/// configuration. Only the HOTP counter is mutable, and it is only changed by
/// [`Otp::verify_code`] and [`Otp::create_hotp_code`].
#[derive(Clone, PartialEq, Eq)]
pub struct Otp {
    issuer: &'static str,
    account: &'static str,
    /// Base32 encoded, decoded on every use
    secret: String,
    /// 0 = current interval/counter only
    /// 1 = TOTP: previous, current, next. HOTP: current, next
    /// Larger windows widen the brute-force surface (RFC 4226 §7.4, RFC 6238 §5.2)
    window: u32,
    mode: Mode,
}

impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Otp")
            .field("issuer", &self.issuer)
            .field("account", &self.account)
            .field("window", &self.window)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Otp {
    /// Time-based instance, suited to authenticator apps
    pub fn totp<S: Into<String>>(secret: S) -> Self {
        Self::new(secret.into(), Mode::Totp)
    }

    /// Counter-based instance starting at [`DEFAULT_HOTP_COUNTER`]
    ///
    /// Suited to codes delivered out of band (email, SMS). Presenting an HOTP
    /// QR code to a user drifts client and server counters apart unless the
    /// server counter is persisted, see [`store::CounterStore`].
    pub fn hotp<S: Into<String>>(secret: S) -> Self {
        Self::hotp_at(secret, DEFAULT_HOTP_COUNTER)
    }

    /// Counter-based instance resuming at a stored counter
    pub fn hotp_at<S: Into<String>>(secret: S, counter: u64) -> Self {
        Self::new(secret.into(), Mode::Hotp { counter })
    }

    fn new(secret: String, mode: Mode) -> Self {
        Self {
            issuer: ISSUER,
            account: ACCOUNT,
            secret,
            window: DEFAULT_WINDOW,
            mode,
        }
    }

    /// Configure the resynchronization window
    #[must_use]
    pub const fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// TOTP, or HOTP with its current counter
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Resynchronization window, 0 when disabled
    #[must_use]
    pub const fn window(&self) -> u32 {
        self.window
    }

    /// Current HOTP counter, `None` for TOTP
    #[must_use]
    pub const fn counter(&self) -> Option<u64> {
        match self.mode {
            Mode::Totp => None,
            Mode::Hotp { counter } => Some(counter),
        }
    }

    /// Base32 shared secret as configured
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Service provider name, always [`ISSUER`]
    #[must_use]
    pub const fn issuer(&self) -> &str {
        self.issuer
    }

    /// Account label, always [`ACCOUNT`]
    #[must_use]
    pub const fn account(&self) -> &str {
        self.account
    }

    /// Key URI understood by Google Authenticator and friends
    ///
    /// `otpauth://{totp|hotp}/{issuer}:{account}?secret={secret}&issuer={issuer}[&counter={counter}]`
    ///
    /// Nothing is percent-encoded: issuer and account are fixed constants.
    #[must_use]
    pub fn create_uri(&self) -> String {
        let counter = match self.mode {
            Mode::Totp => String::new(),
            Mode::Hotp { counter } => format!("&counter={counter}"),
        };

        format!(
            "otpauth://{}/{}:{}?secret={}&issuer={}{}",
            self.mode, self.issuer, self.account, self.secret, self.issuer, counter
        )
    }

    /// Verify a user supplied code against the system clock
    ///
    /// # Errors
    ///
    /// Same as [`Otp::verify_code_at`], plus [`Error::SystemTime`] when the
    /// clock is before the Unix epoch
    pub fn verify_code(&mut self, code: &str) -> Result<bool, Error> {
        let now = system_time()?;
        self.verify_code_at(code, now)
    }

    /// Verify a user supplied code as if the current time were `unix_seconds`
    ///
    /// TOTP checks every interval in `current - window ..= current + window`.
    /// HOTP checks `counter ..= counter + window`; on a match at offset `i` the
    /// counter moves to `counter + i + 1`, otherwise it still moves by one.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCodeLength`] if `code` is not [`CODE_LENGTH`] bytes long,
    ///   checked before anything else
    /// - [`Error::InvalidSecretEncoding`] if the secret is not valid Base32
    pub fn verify_code_at(&mut self, code: &str, unix_seconds: u64) -> Result<bool, Error> {
        if code.len() != CODE_LENGTH {
            return Err(Error::InvalidCodeLength(code.len()));
        }

        let mac = SecretKey::from_base32(&self.secret)?.mac()?;

        match self.mode {
            Mode::Totp => Ok(verify_totp(&mac, code, time_interval(unix_seconds), self.window)),
            Mode::Hotp { counter } => {
                let (valid, next) = verify_hotp(&mac, code, counter, self.window);
                self.mode = Mode::Hotp { counter: next };
                Ok(valid)
            }
        }
    }

    /// Code for an explicit HOTP counter, for manual out-of-band delivery
    ///
    /// In HOTP mode the instance counter is moved to `counter`. A TOTP instance
    /// only computes the code; its mode never changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSecretEncoding`] if the secret is not valid Base32
    pub fn create_hotp_code(&mut self, counter: u64) -> Result<String, Error> {
        let mac = SecretKey::from_base32(&self.secret)?.mac()?;
        let code = compute_with_mac(&mac, &counter.to_be_bytes());

        if let Mode::Hotp { counter: current } = &mut self.mode {
            *current = counter;
        }

        Ok(code)
    }

    /// Code this instance accepts at window offset 0 right now
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is invalid or system time retrieval fails
    pub fn generate_code(&self) -> Result<String, Error> {
        let now = system_time()?;
        self.generate_code_at(now)
    }

    /// Code this instance accepts at window offset 0 at `unix_seconds`
    ///
    /// HOTP ignores the timestamp and uses the current counter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSecretEncoding`] if the secret is not valid Base32
    pub fn generate_code_at(&self, unix_seconds: u64) -> Result<String, Error> {
        let mac = SecretKey::from_base32(&self.secret)?.mac()?;

        Ok(match self.mode {
            Mode::Totp => compute_with_mac(&mac, &time_interval(unix_seconds).to_be_bytes()),
            Mode::Hotp { counter } => compute_with_mac(&mac, &counter.to_be_bytes()),
        })
    }

    /// Remaining valid time of the current TOTP code, in seconds
    ///
    /// # Errors
    ///
    /// Returns an error when system time retrieval fails
    pub fn ttl(&self) -> Result<u64, Error> {
        let now = system_time()?;
        Ok(ttl_at(now))
    }

    /// Provisioning URI rendered as a QR PNG
    ///
    /// # Errors
    ///
    /// Returns [`Error::QrEncode`] if QR or PNG encoding fails
    #[cfg(feature = "qr")]
    pub fn qr_png(&self) -> Result<Vec<u8>, Error> {
        qr::new_qr(&self.create_uri())
    }
}

/// Derive the 6-digit code for a Base32 secret and a moving factor
///
/// `interval` is `unix_time / 30` for TOTP or the counter for HOTP; it is
/// hashed as its big-endian 8-byte encoding.
///
/// # Errors
///
/// Returns [`Error::InvalidSecretEncoding`] if the secret is not valid Base32
pub fn create_code(secret: &str, interval: i64) -> Result<String, Error> {
    let mac = SecretKey::from_base32(secret)?.mac()?;
    Ok(compute_with_mac(&mac, &interval.to_be_bytes()))
}

fn verify_totp(mac: &HmacSha1, code: &str, current: i64, window: u32) -> bool {
    let window = i64::from(window);

    (current - window..=current + window)
        .any(|interval| codes_match(&compute_with_mac(mac, &interval.to_be_bytes()), code))
}

/// Returns whether the code matched and the counter to store next
fn verify_hotp(mac: &HmacSha1, code: &str, counter: u64, window: u32) -> (bool, u64) {
    for offset in 0..=u64::from(window) {
        let candidate = counter.saturating_add(offset);
        if codes_match(&compute_with_mac(mac, &candidate.to_be_bytes()), code) {
            let next = candidate.saturating_add(1);
            tracing::debug!(counter, offset, next, "hotp counter resynchronized");
            return (true, next);
        }
    }

    (false, counter.saturating_add(1))
}

#[inline]
fn codes_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

/// RFC 4226: HOTP(K,C) = Truncate(HMAC-SHA-1(K,C))
#[inline]
fn compute_with_mac(mac: &HmacSha1, message: &[u8]) -> String {
    let digest: [u8; 20] = mac.clone().chain_update(message).finalize().into_bytes().into();
    format_code(truncation_rfc4226(&digest))
}

/// RFC 4226: Dynamic truncation
///
/// The low nibble of the last byte selects 4 bytes, read big-endian, with the
/// most significant bit masked off. The offset is at most 15, so the read
/// always stays inside a SHA-1 digest
#[inline]
fn truncation_rfc4226(hmac: &[u8; 20]) -> u32 {
    let offset = usize::from(hmac[19] & 0x0f);

    let p = u32::from_be_bytes([
        hmac[offset],
        hmac[offset + 1],
        hmac[offset + 2],
        hmac[offset + 3],
    ]);

    p & 0x7FFF_FFFF
}

/// Reduce a truncated value to [`CODE_LENGTH`] decimal digits, leading zeros kept
#[must_use]
#[inline]
pub fn format_code(value: u32) -> String {
    format!("{:0width$}", value % MODULUS, width = CODE_LENGTH)
}

/// RFC 6238: T = (Current Unix time - T0) / X, with T0 = 0 and X = 30
#[must_use]
#[inline]
pub const fn time_interval(unix_seconds: u64) -> i64 {
    // u64::MAX / 30 still fits in an i64
    (unix_seconds / PERIOD) as i64
}

/// Seconds left before the TOTP code for `unix_seconds` rolls over
#[must_use]
#[inline]
pub const fn ttl_at(unix_seconds: u64) -> u64 {
    PERIOD - unix_seconds % PERIOD
}

/// Time interval for the current system time
///
/// # Errors
///
/// Returns an error when system time retrieval fails
pub fn current_interval() -> Result<i64, Error> {
    Ok(time_interval(system_time()?))
}

/// Get the current system time as Unix timestamp
///
/// # Errors
///
/// Returns an error when system time is earlier than Unix epoch (1970-01-01 00:00:00 UTC)
#[inline]
pub(crate) fn system_time() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(Error::SystemTime)
}
