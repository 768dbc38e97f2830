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

//! Keys and queries that locate cold chain records in the ledger.

use crate::ledger::{create_composite_key, ContextError};

/// Private collection holding vaccine batches.
pub const BATCH_COLLECTION: &str = "BatchCollection";
/// Object type of the temperature log composite key.
pub const TEMPERATURE_LOG_OBJECT_TYPE: &str = "TempLog";
/// Prefix of the public key holding a batch's delivery status.
pub const DELIVERY_PREFIX: &str = "DELIVERY_";

pub const VACCINE_BATCH_DOC_TYPE: &str = "vaccineBatch";
pub const TEMPERATURE_LOG_ASSET_TYPE: &str = "TemperatureLog";

pub fn compute_delivery_status_address(batch_id: &str) -> String {
    format!("{}{}", DELIVERY_PREFIX, batch_id)
}

/// Composite key `TempLog[batch_id, timestamp]`.
pub fn compute_temperature_log_address(
    batch_id: &str,
    timestamp: &str,
) -> Result<String, ContextError> {
    create_composite_key(TEMPERATURE_LOG_OBJECT_TYPE, &[batch_id, timestamp])
}

/// Rich query selecting every vaccine batch document.
pub fn batch_selector_query() -> String {
    serde_json::json!({ "selector": { "docType": VACCINE_BATCH_DOC_TYPE } }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::split_composite_key;

    #[test]
    fn test_delivery_status_address() {
        assert_eq!(compute_delivery_status_address("B1"), "DELIVERY_B1");
    }

    #[test]
    fn test_temperature_log_address_splits_back() {
        let key = compute_temperature_log_address("B1", "2021-06-01T10:00:00Z").unwrap();
        let (object_type, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(object_type, TEMPERATURE_LOG_OBJECT_TYPE);
        assert_eq!(attributes, vec!["B1", "2021-06-01T10:00:00Z"]);
    }

    #[test]
    fn test_batch_selector_query() {
        let query: serde_json::Value = serde_json::from_str(&batch_selector_query()).unwrap();
        assert_eq!(query["selector"]["docType"], "vaccineBatch");
    }
}
