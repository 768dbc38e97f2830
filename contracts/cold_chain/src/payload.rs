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

use cold_chain_sdk::ledger::{ApplyError, TransactionRequest};
use cold_chain_sdk::protocol::cold_chain::payload::Action;

/// Parses the request's function and positional arguments into an `Action`.
pub fn parse_action(request: &TransactionRequest) -> Result<Action, ApplyError> {
    Action::from_invocation(request.function(), request.args())
        .map_err(|err| ApplyError::InvalidTransaction(format!("Cannot build action: {}", err)))
}

pub fn validate_payload(action: &Action) -> Result<(), ApplyError> {
    if let Some(batch_id) = action.batch_id() {
        validate_batch_id(batch_id)?;
    }

    if let Action::CreateBatch(create) = action {
        if create.min_temp() > create.max_temp() {
            return Err(ApplyError::InvalidTransaction(format!(
                "minTemp {}°C cannot be greater than maxTemp {}°C",
                create.min_temp(),
                create.max_temp()
            )));
        }
    }

    Ok(())
}

fn validate_batch_id(batch_id: &str) -> Result<(), ApplyError> {
    if batch_id.is_empty() {
        return Err(ApplyError::InvalidTransaction(String::from(
            "Batch ID cannot be empty string",
        )));
    }
    if batch_id.contains('\u{0}') {
        return Err(ApplyError::InvalidTransaction(String::from(
            "Batch ID cannot contain U+0000",
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use cold_chain_sdk::ledger::{TransactionRequestBuilder, TxTimestamp};
    use cold_chain_sdk::protocol::cold_chain::payload::CreateBatchAction;

    fn create_action(min_temp: i32, max_temp: i32) -> Action {
        Action::CreateBatch(CreateBatchAction::new(
            "B1".to_string(),
            "2021-05-01".to_string(),
            "2022-05-01".to_string(),
            min_temp,
            max_temp,
        ))
    }

    #[test]
    // Test that an empty batch id is rejected
    fn test_empty_batch_id() {
        match validate_payload(&Action::ReadBatch("".to_string())) {
            Err(ApplyError::InvalidTransaction(err)) => assert!(err.contains("empty")),
            res => panic!("Expected InvalidTransaction, got {:?}", res),
        }
    }

    #[test]
    // Test that a reversed temperature envelope is rejected
    fn test_min_temp_above_max_temp() {
        assert!(validate_payload(&create_action(2, 8)).is_ok());
        assert!(validate_payload(&create_action(5, 5)).is_ok());
        match validate_payload(&create_action(9, 2)) {
            Err(ApplyError::InvalidTransaction(err)) => assert!(err.contains("minTemp")),
            res => panic!("Expected InvalidTransaction, got {:?}", res),
        }
    }

    #[test]
    // Test that GetAllBatch has nothing to validate
    fn test_get_all_batch_valid() {
        assert!(validate_payload(&Action::GetAllBatch).is_ok());
    }

    #[test]
    // Test that a malformed invocation becomes an invalid transaction
    fn test_parse_action_wrong_arguments() {
        let request = TransactionRequestBuilder::new()
            .with_creator("Org1MSP".to_string())
            .with_function("CreateBatch".to_string())
            .with_args(vec!["B1".to_string()])
            .with_timestamp(TxTimestamp::new(0, 0))
            .build()
            .unwrap();

        match parse_action(&request) {
            Err(ApplyError::InvalidTransaction(err)) => assert!(err.contains("CreateBatch")),
            res => panic!("Expected InvalidTransaction, got {:?}", res),
        }
    }
}
