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

//! Contract functions and their positional arguments.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBatchAction {
    batch_id: String,
    manufacture_date: String,
    expiry_date: String,
    min_temp: i32,
    max_temp: i32,
}

impl CreateBatchAction {
    pub fn new(
        batch_id: String,
        manufacture_date: String,
        expiry_date: String,
        min_temp: i32,
        max_temp: i32,
    ) -> Self {
        CreateBatchAction {
            batch_id,
            manufacture_date,
            expiry_date,
            min_temp,
            max_temp,
        }
    }
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
    pub fn manufacture_date(&self) -> &str {
        &self.manufacture_date
    }
    pub fn expiry_date(&self) -> &str {
        &self.expiry_date
    }
    pub fn min_temp(&self) -> i32 {
        self.min_temp
    }
    pub fn max_temp(&self) -> i32 {
        self.max_temp
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddTemperatureLogAction {
    batch_id: String,
    temp_now: i32,
}

impl AddTemperatureLogAction {
    pub fn new(batch_id: String, temp_now: i32) -> Self {
        AddTemperatureLogAction { batch_id, temp_now }
    }
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
    pub fn temp_now(&self) -> i32 {
        self.temp_now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    VaccineExists(String),
    CreateBatch(CreateBatchAction),
    ReadBatch(String),
    DeleteBatch(String),
    GetAllBatch,
    DeliverToTransporter(String),
    AddTemperatureLog(AddTemperatureLogAction),
    GetTemperatureLogHistory(String),
    VerifyTemperatureLogs(String),
    StartDelivery(String),
    CompleteDelivery(String),
    GetDeliveryStatus(String),
}

#[derive(Debug, PartialEq)]
pub enum PayloadError {
    UnknownFunction(String),
    WrongArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },
    InvalidArgument(String),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PayloadError::UnknownFunction(ref name) => write!(f, "Unknown function: {}", name),
            PayloadError::WrongArgumentCount {
                ref function,
                expected,
                actual,
            } => write!(
                f,
                "{} expects {} argument(s) but received {}",
                function, expected, actual
            ),
            PayloadError::InvalidArgument(ref msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl Error for PayloadError {}

fn expect_args<'a>(
    function: &str,
    args: &'a [String],
    expected: usize,
) -> Result<&'a [String], PayloadError> {
    if args.len() != expected {
        return Err(PayloadError::WrongArgumentCount {
            function: function.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(args)
}

fn parse_temperature(name: &str, value: &str) -> Result<i32, PayloadError> {
    value.trim().parse::<i32>().map_err(|_| {
        PayloadError::InvalidArgument(format!("{} must be an integer, got {:?}", name, value))
    })
}

impl Action {
    /// Builds an action from a function name and its positional arguments.
    ///
    /// ```
    /// use cold_chain_sdk::protocol::cold_chain::payload::Action;
    ///
    /// let action = Action::from_invocation(
    ///     "AddTemperatureLog",
    ///     &["B1".to_string(), "5".to_string()],
    /// ).unwrap();
    /// assert_eq!(action.name(), "AddTemperatureLog");
    /// assert_eq!(action.batch_id(), Some("B1"));
    /// ```
    pub fn from_invocation(function: &str, args: &[String]) -> Result<Action, PayloadError> {
        let single = |args: &[String]| -> Result<String, PayloadError> {
            Ok(expect_args(function, args, 1)?[0].clone())
        };

        let action = match function {
            "VaccineExists" => Action::VaccineExists(single(args)?),
            "CreateBatch" => {
                let args = expect_args(function, args, 5)?;
                Action::CreateBatch(CreateBatchAction::new(
                    args[0].clone(),
                    args[1].clone(),
                    args[2].clone(),
                    parse_temperature("minTemp", &args[3])?,
                    parse_temperature("maxTemp", &args[4])?,
                ))
            }
            "ReadBatch" => Action::ReadBatch(single(args)?),
            "DeleteBatch" => Action::DeleteBatch(single(args)?),
            "GetAllBatch" => {
                expect_args(function, args, 0)?;
                Action::GetAllBatch
            }
            "DeliverToTransporter" => Action::DeliverToTransporter(single(args)?),
            "AddTemperatureLog" => {
                let args = expect_args(function, args, 2)?;
                Action::AddTemperatureLog(AddTemperatureLogAction::new(
                    args[0].clone(),
                    parse_temperature("tempNow", &args[1])?,
                ))
            }
            "GetTemperatureLogHistory" => Action::GetTemperatureLogHistory(single(args)?),
            "VerifyTemperatureLogs" => Action::VerifyTemperatureLogs(single(args)?),
            "StartDelivery" => Action::StartDelivery(single(args)?),
            "CompleteDelivery" => Action::CompleteDelivery(single(args)?),
            "GetDeliveryStatus" => Action::GetDeliveryStatus(single(args)?),
            _ => return Err(PayloadError::UnknownFunction(function.to_string())),
        };

        Ok(action)
    }

    /// The contract function this action invokes.
    pub fn name(&self) -> &'static str {
        match self {
            Action::VaccineExists(_) => "VaccineExists",
            Action::CreateBatch(_) => "CreateBatch",
            Action::ReadBatch(_) => "ReadBatch",
            Action::DeleteBatch(_) => "DeleteBatch",
            Action::GetAllBatch => "GetAllBatch",
            Action::DeliverToTransporter(_) => "DeliverToTransporter",
            Action::AddTemperatureLog(_) => "AddTemperatureLog",
            Action::GetTemperatureLogHistory(_) => "GetTemperatureLogHistory",
            Action::VerifyTemperatureLogs(_) => "VerifyTemperatureLogs",
            Action::StartDelivery(_) => "StartDelivery",
            Action::CompleteDelivery(_) => "CompleteDelivery",
            Action::GetDeliveryStatus(_) => "GetDeliveryStatus",
        }
    }

    /// The batch the action targets; `None` only for `GetAllBatch`.
    pub fn batch_id(&self) -> Option<&str> {
        match self {
            Action::VaccineExists(id)
            | Action::ReadBatch(id)
            | Action::DeleteBatch(id)
            | Action::DeliverToTransporter(id)
            | Action::GetTemperatureLogHistory(id)
            | Action::VerifyTemperatureLogs(id)
            | Action::StartDelivery(id)
            | Action::CompleteDelivery(id)
            | Action::GetDeliveryStatus(id) => Some(id),
            Action::CreateBatch(action) => Some(action.batch_id()),
            Action::AddTemperatureLog(action) => Some(action.batch_id()),
            Action::GetAllBatch => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_create_batch_parses_temperatures() {
        let action = Action::from_invocation(
            "CreateBatch",
            &args(&["B1", "2021-05-01", "2022-05-01", "-20", " 8"]),
        )
        .unwrap();

        assert_eq!(
            action,
            Action::CreateBatch(CreateBatchAction::new(
                "B1".to_string(),
                "2021-05-01".to_string(),
                "2022-05-01".to_string(),
                -20,
                8
            ))
        );
    }

    #[test]
    fn test_non_integer_temperature_is_rejected() {
        match Action::from_invocation("AddTemperatureLog", &args(&["B1", "4.5"])) {
            Err(PayloadError::InvalidArgument(msg)) => assert!(msg.contains("tempNow")),
            res => panic!("Expected InvalidArgument, got {:?}", res),
        }
    }

    #[test]
    fn test_wrong_argument_count() {
        assert_eq!(
            Action::from_invocation("ReadBatch", &args(&[])),
            Err(PayloadError::WrongArgumentCount {
                function: "ReadBatch".to_string(),
                expected: 1,
                actual: 0,
            })
        );
        assert!(Action::from_invocation("GetAllBatch", &args(&["extra"])).is_err());
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            Action::from_invocation("TransferOwnership", &args(&["B1"])),
            Err(PayloadError::UnknownFunction("TransferOwnership".to_string()))
        );
    }

    /// Every function name round-trips through `name`.
    #[test]
    fn test_name_matches_function() {
        let invocations = vec![
            ("VaccineExists", args(&["B1"])),
            ("ReadBatch", args(&["B1"])),
            ("DeleteBatch", args(&["B1"])),
            ("GetAllBatch", args(&[])),
            ("DeliverToTransporter", args(&["B1"])),
            ("GetTemperatureLogHistory", args(&["B1"])),
            ("VerifyTemperatureLogs", args(&["B1"])),
            ("StartDelivery", args(&["B1"])),
            ("CompleteDelivery", args(&["B1"])),
            ("GetDeliveryStatus", args(&["B1"])),
        ];
        for (function, args) in invocations {
            assert_eq!(Action::from_invocation(function, &args).unwrap().name(), function);
        }
    }
}
