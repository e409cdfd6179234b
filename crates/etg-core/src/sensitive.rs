//! Redacting wrapper for credentials
//!
//! The remote store bearer token travels through configuration structs that
//! derive `Debug`; wrapping it keeps it out of logs and error output.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// ```
/// use etg_core::Sensitive;
///
/// let token = Sensitive::new("ya29.secret");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"ya29.secret");
/// ```
#[derive(Clone, Default)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value, only where it must be sent
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}
