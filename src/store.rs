//! Storage capabilities the verification flow depends on
//!
//! The engine itself never persists anything. HOTP counters and the last
//! accepted code only survive between requests when the caller threads them
//! through one of these traits.

use crate::Error;
use std::collections::HashMap;

/// Durable HOTP counter, keyed by account
pub trait CounterStore {
    /// Last saved counter for `account`, `None` if nothing was saved yet
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the backend fails
    fn load(&self, account: &str) -> Result<Option<u64>, Error>;

    /// Persist the counter the server expects next
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the backend fails
    fn save(&mut self, account: &str, counter: u64) -> Result<(), Error>;
}

/// Codes that were already exchanged, for replay prevention
pub trait UsedCodeStore {
    /// Whether `code` was accepted before
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the backend fails
    fn is_used(&self, code: &str) -> Result<bool, Error>;

    /// Forget every earlier code and remember `code` as the latest accepted one
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the backend fails
    fn replace(&mut self, code: &str) -> Result<(), Error>;
}

/// Counters held in a map, lost when the value is dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryCounterStore {
    counters: HashMap<String, u64>,
}

impl MemoryCounterStore {
    /// Empty store, every account starts from its configured counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn load(&self, account: &str) -> Result<Option<u64>, Error> {
        Ok(self.counters.get(account).copied())
    }

    fn save(&mut self, account: &str, counter: u64) -> Result<(), Error> {
        self.counters.insert(account.to_owned(), counter);
        Ok(())
    }
}

/// Keeps only the most recent accepted code
#[derive(Debug, Default, Clone)]
pub struct MemoryUsedCodes {
    last: Option<String>,
}

impl MemoryUsedCodes {
    /// Store with no accepted code yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently accepted code
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl UsedCodeStore for MemoryUsedCodes {
    fn is_used(&self, code: &str) -> Result<bool, Error> {
        Ok(self.last.as_deref() == Some(code))
    }

    fn replace(&mut self, code: &str) -> Result<(), Error> {
        self.last = Some(code.to_owned());
        Ok(())
    }
}

impl<T: CounterStore + ?Sized> CounterStore for &mut T {
    fn load(&self, account: &str) -> Result<Option<u64>, Error> {
        (**self).load(account)
    }

    fn save(&mut self, account: &str, counter: u64) -> Result<(), Error> {
        (**self).save(account, counter)
    }
}

impl<T: UsedCodeStore + ?Sized> UsedCodeStore for &mut T {
    fn is_used(&self, code: &str) -> Result<bool, Error> {
        (**self).is_used(code)
    }

    fn replace(&mut self, code: &str) -> Result<(), Error> {
        (**self).replace(code)
    }
}
