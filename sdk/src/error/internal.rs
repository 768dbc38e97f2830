// Copyright 2021 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error;
use std::fmt;

/// An error which is not the caller's fault and cannot be corrected by retrying with
/// different input, such as a poisoned lock or a corrupt snapshot.
pub struct InternalError {
    message: Option<String>,
    prefix: Option<String>,
    source: Option<Box<dyn error::Error>>,
}

impl InternalError {
    /// Wraps `source`; the display string is the source's display string.
    ///
    /// ```
    /// use cold_chain_sdk::error::InternalError;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    /// let err = InternalError::from_source(Box::new(io_err));
    /// assert_eq!(err.to_string(), "disk on fire");
    /// ```
    pub fn from_source(source: Box<dyn error::Error>) -> Self {
        Self {
            message: None,
            prefix: None,
            source: Some(source),
        }
    }

    /// Wraps `source`, displaying as `"{prefix}: {source}"`.
    ///
    /// ```
    /// use cold_chain_sdk::error::InternalError;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    /// let err = InternalError::from_source_with_prefix(
    ///     Box::new(io_err),
    ///     "Cannot load ledger".to_string(),
    /// );
    /// assert_eq!(err.to_string(), "Cannot load ledger: disk on fire");
    /// ```
    pub fn from_source_with_prefix(source: Box<dyn error::Error>, prefix: String) -> Self {
        Self {
            message: None,
            prefix: Some(prefix),
            source: Some(source),
        }
    }

    /// Creates an error with no underlying source.
    ///
    /// ```
    /// use cold_chain_sdk::error::InternalError;
    ///
    /// let err = InternalError::with_message("mutex lock poisoned".to_string());
    /// assert_eq!(err.to_string(), "mutex lock poisoned");
    /// ```
    pub fn with_message(message: String) -> Self {
        Self {
            message: Some(message),
            prefix: None,
            source: None,
        }
    }
}

impl error::Error for InternalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_deref()
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.message, &self.prefix, &self.source) {
            (Some(message), _, _) => write!(f, "{}", message),
            (None, Some(prefix), Some(source)) => write!(f, "{}: {}", prefix, source),
            (None, None, Some(source)) => write!(f, "{}", source),
            _ => f.write_str("InternalError"),
        }
    }
}

impl fmt::Debug for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut debug = f.debug_struct("InternalError");
        if let Some(message) = &self.message {
            debug.field("message", message);
        }
        if let Some(prefix) = &self.prefix {
            debug.field("prefix", prefix);
        }
        if let Some(source) = &self.source {
            debug.field("source", source);
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_with_message() {
        let err = InternalError::with_message("test message".to_string());
        assert_eq!(
            format!("{:?}", err),
            "InternalError { message: \"test message\" }"
        );
    }

    #[test]
    fn test_debug_from_source_with_prefix() {
        let err = InternalError::from_source_with_prefix(
            Box::new(InternalError::with_message("inner".to_string())),
            "outer".to_string(),
        );
        assert_eq!(
            format!("{:?}", err),
            "InternalError { prefix: \"outer\", source: InternalError { message: \"inner\" } }"
        );
    }

    /// The source is reachable through `std::error::Error::source`.
    #[test]
    fn test_source_is_exposed() {
        use std::error::Error;

        let err =
            InternalError::from_source(Box::new(InternalError::with_message("inner".to_string())));
        assert_eq!(err.to_string(), "inner");
        assert!(err.source().is_some());
        assert!(InternalError::with_message("x".into()).source().is_none());
    }
}
