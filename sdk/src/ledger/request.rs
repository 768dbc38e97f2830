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

use std::collections::HashMap;

use chrono::{SecondsFormat, TimeZone, Utc};

use crate::error::InternalError;
use crate::protocol::errors::BuilderError;

/// The time the ordering service assigned to a transaction. Every replica executing the
/// transaction sees the same value, unlike the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TxTimestamp {
    seconds: i64,
    nanos: u32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: u32) -> Self {
        TxTimestamp { seconds, nanos }
    }

    /// Timestamp for a transaction being submitted right now.
    pub fn now() -> Self {
        let now = Utc::now();
        TxTimestamp {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Formats the timestamp as RFC 3339 in UTC with whole seconds, e.g.
    /// `2021-06-01T10:00:00Z`. Strings in this form sort chronologically.
    pub fn to_rfc3339(&self) -> Result<String, InternalError> {
        Utc.timestamp_opt(self.seconds, self.nanos)
            .single()
            .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true))
            .ok_or_else(|| {
                InternalError::with_message(format!(
                    "Transaction timestamp {}.{:09} is out of range",
                    self.seconds, self.nanos
                ))
            })
    }
}

/// One invocation of a contract function, as delivered by the execution environment.
///
/// The creator is the organization (MSP) id the environment verified for the submitting
/// client; it is never taken from the arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    creator: String,
    function: String,
    args: Vec<String>,
    transient: HashMap<String, Vec<u8>>,
    timestamp: TxTimestamp,
}

impl TransactionRequest {
    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Values passed alongside the transaction that are never written to the replicated
    /// transaction history.
    pub fn transient(&self) -> &HashMap<String, Vec<u8>> {
        &self.transient
    }

    pub fn timestamp(&self) -> &TxTimestamp {
        &self.timestamp
    }

    pub fn into_builder(self) -> TransactionRequestBuilder {
        TransactionRequestBuilder::new()
            .with_creator(self.creator)
            .with_function(self.function)
            .with_args(self.args)
            .with_transient(self.transient)
            .with_timestamp(self.timestamp)
    }
}

#[derive(Default, Debug, Clone)]
pub struct TransactionRequestBuilder {
    creator: Option<String>,
    function: Option<String>,
    args: Vec<String>,
    transient: HashMap<String, Vec<u8>>,
    timestamp: Option<TxTimestamp>,
}

impl TransactionRequestBuilder {
    pub fn new() -> Self {
        TransactionRequestBuilder::default()
    }

    pub fn with_creator(mut self, value: String) -> Self {
        self.creator = Some(value);
        self
    }

    pub fn with_function(mut self, value: String) -> Self {
        self.function = Some(value);
        self
    }

    pub fn with_args(mut self, value: Vec<String>) -> Self {
        self.args = value;
        self
    }

    pub fn with_transient(mut self, value: HashMap<String, Vec<u8>>) -> Self {
        self.transient = value;
        self
    }

    pub fn with_transient_field(mut self, key: String, value: Vec<u8>) -> Self {
        self.transient.insert(key, value);
        self
    }

    pub fn with_timestamp(mut self, value: TxTimestamp) -> Self {
        self.timestamp = Some(value);
        self
    }

    pub fn build(self) -> Result<TransactionRequest, BuilderError> {
        let creator = self
            .creator
            .ok_or_else(|| BuilderError::MissingField("creator".into()))?;
        let function = self
            .function
            .ok_or_else(|| BuilderError::MissingField("function".into()))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| BuilderError::MissingField("timestamp".into()))?;

        Ok(TransactionRequest {
            creator,
            function,
            args: self.args,
            transient: self.transient,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formats_as_utc_seconds() {
        let timestamp = TxTimestamp::new(1_622_541_600, 123_456_789);
        assert_eq!(timestamp.to_rfc3339().unwrap(), "2021-06-01T10:00:00Z");
    }

    /// Formatted timestamps sort in the same order as the timestamps themselves.
    #[test]
    fn test_formatted_timestamps_sort_chronologically() {
        let earlier = TxTimestamp::new(1_622_541_599, 0).to_rfc3339().unwrap();
        let later = TxTimestamp::new(1_622_541_600, 0).to_rfc3339().unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(TxTimestamp::new(i64::MAX, 0).to_rfc3339().is_err());
    }

    #[test]
    fn test_request_builder_requires_creator() {
        let result = TransactionRequestBuilder::new()
            .with_function("ReadBatch".to_string())
            .with_timestamp(TxTimestamp::new(1, 0))
            .build();
        match result {
            Err(BuilderError::MissingField(field)) => assert_eq!(field, "creator"),
            res => panic!("Expected MissingField, got {:?}", res),
        }
    }

    #[test]
    fn test_request_into_builder() {
        let request = TransactionRequestBuilder::new()
            .with_creator("Org1MSP".to_string())
            .with_function("ReadBatch".to_string())
            .with_args(vec!["B1".to_string()])
            .with_transient_field("manufacturer".to_string(), b"Acme".to_vec())
            .with_timestamp(TxTimestamp::new(1, 0))
            .build()
            .unwrap();

        let rebuilt = request.clone().into_builder().build().unwrap();
        assert_eq!(request, rebuilt);
    }
}
