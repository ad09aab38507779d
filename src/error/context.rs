//! Context helpers for attaching a message to lower-level errors.

use super::{BenchError, Result};

/// Attach context to a fallible result.
pub trait ResultExt<T> {
    /// Wrap the error with a static or computed message.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::WithContext` when `self` is an error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| BenchError::WithContext {
            context: f().into(),
            source: Box::new(source),
        })
    }
}

/// Turn a missing value into a config error.
pub trait OptionExt<T> {
    /// # Errors
    ///
    /// Returns `BenchError::Config` when `self` is `None`.
    fn ok_or_config<S: Into<String>>(self, message: S) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config<S: Into<String>>(self, message: S) -> Result<T> {
        self.ok_or_else(|| BenchError::Config(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_context_prefixes_message() {
        let raw: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("permission denied"));
        let err = raw.with_context(|| "writing results").unwrap_err();
        assert_eq!(err.to_string(), "writing results: permission denied");
    }

    #[test]
    fn ok_or_config_maps_none() {
        let missing: Option<u32> = None;
        let err = missing.ok_or_config("bootstrap servers not set").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
        assert_eq!(Some(3).ok_or_config("unused").unwrap(), 3);
    }
}
