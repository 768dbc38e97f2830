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

use std::error::Error;
use std::fmt;

use crate::error::InternalError;

/// Errors raised by the ledger itself, independent of any contract logic.
#[derive(Debug)]
pub enum ContextError {
    /// Returned when a key or composite key component is malformed.
    InvalidKey(String),
    /// Returned when a rich query cannot be parsed or evaluated.
    QueryError(String),
    /// Returned when the underlying store fails.
    InternalError(InternalError),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ContextError::InvalidKey(ref msg) => write!(f, "InvalidKey: {}", msg),
            ContextError::QueryError(ref msg) => write!(f, "QueryError: {}", msg),
            ContextError::InternalError(ref err) => err.fmt(f),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ContextError::InvalidKey(_) => None,
            ContextError::QueryError(_) => None,
            ContextError::InternalError(ref err) => Some(err),
        }
    }
}

impl From<InternalError> for ContextError {
    fn from(err: InternalError) -> ContextError {
        ContextError::InternalError(err)
    }
}

/// Reasons a transaction is rejected. Any of these aborts the transaction and discards all of
/// its writes.
#[derive(Debug)]
pub enum ApplyError {
    /// The invoking organization may not perform the operation.
    AccessDenied {
        operation: String,
        organization: String,
    },
    /// An entity that must be absent is already present.
    AlreadyExists(String),
    /// An entity that must be present is absent.
    NotFound(String),
    /// A field that must be supplied through the transient map was not.
    MissingTransientField(String),
    /// The requested transition is not valid from the entity's current status.
    InvalidStateTransition(String),
    /// The request itself is malformed: unknown function, bad arguments.
    InvalidTransaction(String),
    /// Stored bytes do not decode into the expected record, or a record cannot be encoded.
    SerializationError(String),
    /// The ledger failed underneath the contract.
    StoreError(ContextError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ApplyError::AccessDenied {
                ref operation,
                ref organization,
            } => write!(
                f,
                "AccessDenied: {} cannot be invoked by organization {}",
                operation, organization
            ),
            ApplyError::AlreadyExists(ref msg) => write!(f, "AlreadyExists: {}", msg),
            ApplyError::NotFound(ref msg) => write!(f, "NotFound: {}", msg),
            ApplyError::MissingTransientField(ref field) => write!(
                f,
                "MissingTransientField: {} was not specified in transient data",
                field
            ),
            ApplyError::InvalidStateTransition(ref msg) => {
                write!(f, "InvalidStateTransition: {}", msg)
            }
            ApplyError::InvalidTransaction(ref msg) => write!(f, "InvalidTransaction: {}", msg),
            ApplyError::SerializationError(ref msg) => write!(f, "SerializationError: {}", msg),
            ApplyError::StoreError(ref err) => write!(f, "StoreError: {}", err),
        }
    }
}

impl Error for ApplyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ApplyError::StoreError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContextError> for ApplyError {
    fn from(err: ContextError) -> ApplyError {
        ApplyError::StoreError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_names_operation_and_organization() {
        let err = ApplyError::AccessDenied {
            operation: "CreateBatch".to_string(),
            organization: "Org2MSP".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CreateBatch"));
        assert!(msg.contains("Org2MSP"));
    }

    #[test]
    fn test_store_error_keeps_context_error_as_source() {
        let err: ApplyError =
            ContextError::InternalError(InternalError::with_message("boom".into())).into();
        assert_eq!(err.to_string(), "StoreError: boom");
        assert!(err.source().is_some());
    }
}
