//! Code exchange with replay prevention and durable HOTP counters
//!
//! Every failure collapses to the same `false`, so a caller cannot tell a
//! malformed code from a wrong one or from a storage problem. Details go to
//! the `tracing` log instead.

use crate::store::{CounterStore, MemoryCounterStore, MemoryUsedCodes, UsedCodeStore};
use crate::{Error, Otp, OtpConfig, system_time};

/// Validates submitted codes against the configured credential
///
/// `C` persists the HOTP counter, `U` remembers the last accepted code
pub struct Authenticator<C, U> {
    config: OtpConfig,
    counters: C,
    used: U,
}

impl Authenticator<MemoryCounterStore, MemoryUsedCodes> {
    /// Authenticator whose state lives only as long as the value
    pub fn in_memory(config: OtpConfig) -> Self {
        Self::new(config, MemoryCounterStore::new(), MemoryUsedCodes::new())
    }
}

impl<C, U> Authenticator<C, U>
where
    C: CounterStore,
    U: UsedCodeStore,
{
    /// Authenticator over caller supplied stores
    pub fn new(config: OtpConfig, counters: C, used: U) -> Self {
        Self {
            config,
            counters,
            used,
        }
    }

    /// Credential the engine is rebuilt from on every call
    #[must_use]
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// HOTP counter store
    #[must_use]
    pub fn counters(&self) -> &C {
        &self.counters
    }

    /// Replay guard store
    #[must_use]
    pub fn used_codes(&self) -> &U {
        &self.used
    }

    /// Engine as it stands for the next request, HOTP resumed at the stored counter
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithmType`] for a bad config type or
    /// [`Error::Store`] when the counter cannot be loaded
    pub fn otp(&self) -> Result<Otp, Error> {
        let otp = self.config.build()?;
        let Some(configured) = otp.counter() else {
            return Ok(otp);
        };

        let counter = self.counters.load(otp.account())?.unwrap_or(configured);
        self.config.clone().with_counter(counter).build()
    }

    /// Accept or reject a code against the system clock
    pub fn validate(&mut self, code: &str) -> bool {
        match system_time() {
            Ok(now) => self.validate_at(code, now),
            Err(e) => {
                tracing::warn!(error = %e, "otp validation failed");
                false
            }
        }
    }

    /// Accept or reject a code as if the current time were `unix_seconds`
    ///
    /// A code is accepted once: it must verify and must differ from the last
    /// accepted code, which it then replaces.
    pub fn validate_at(&mut self, code: &str, unix_seconds: u64) -> bool {
        match self.try_validate(code, unix_seconds) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "otp validation failed");
                false
            }
        }
    }

    fn try_validate(&mut self, code: &str, unix_seconds: u64) -> Result<bool, Error> {
        let mut otp = self.otp()?;
        let verified = otp.verify_code_at(code, unix_seconds);

        // HOTP moves forward on failures too
        if let Some(counter) = otp.counter() {
            self.counters.save(otp.account(), counter)?;
        }

        if !verified? {
            tracing::debug!(mode = %otp.mode(), "otp code rejected");
            return Ok(false);
        }

        if self.used.is_used(code)? {
            tracing::warn!(mode = %otp.mode(), "otp code replayed");
            return Ok(false);
        }

        self.used.replace(code)?;
        tracing::debug!(mode = %otp.mode(), "otp code accepted");

        Ok(true)
    }
}
