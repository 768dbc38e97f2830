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

use serde::Serialize;

use cold_chain_sdk::ledger::{
    ApplyError, TransactionContext, TransactionHandler, TransactionRequest,
};
use cold_chain_sdk::protocol::cold_chain::payload::{
    Action, AddTemperatureLogAction, CreateBatchAction,
};
use cold_chain_sdk::protocol::cold_chain::state::{
    BatchStatus, DeliveryState, DeliveryStatus, TemperatureLogBuilder, VaccineBatch,
    VaccineBatchBuilder,
};

use crate::payload::{parse_action, validate_payload};
use crate::permissions::PermissionPolicy;
use crate::state::ColdChainState;

const MANUFACTURER_FIELD: &str = "manufacturer";
const VACCINE_TYPE_FIELD: &str = "vaccineType";

/// The value a successful invocation returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Empty,
    Exists(bool),
    Message(String),
    Batch(VaccineBatch),
    Batches(Vec<VaccineBatch>),
    History(Vec<String>),
}

pub struct ColdChainTransactionHandler {
    policy: PermissionPolicy,
}

impl ColdChainTransactionHandler {
    #[allow(clippy::new_without_default)]
    pub fn new() -> ColdChainTransactionHandler {
        ColdChainTransactionHandler {
            policy: PermissionPolicy::new(),
        }
    }

    fn _vaccine_exists(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        Ok(Response::Exists(state.batch_exists(batch_id)?))
    }

    fn _create_batch(
        &self,
        payload: &CreateBatchAction,
        state: &ColdChainState,
        request: &TransactionRequest,
    ) -> Result<Response, ApplyError> {
        let batch_id = payload.batch_id();
        if state.batch_exists(batch_id)? {
            return Err(ApplyError::AlreadyExists(format!(
                "The vaccine batch {} already exists",
                batch_id
            )));
        }

        let manufacturer = transient_field(request, MANUFACTURER_FIELD)?;
        let vaccine_type = transient_field(request, VACCINE_TYPE_FIELD)?;

        let batch = VaccineBatchBuilder::new()
            .with_batch_id(batch_id.to_string())
            .with_manufacturer(manufacturer)
            .with_vaccine_type(vaccine_type)
            .with_manufacture_date(payload.manufacture_date().to_string())
            .with_expiry_date(payload.expiry_date().to_string())
            .with_min_temp(payload.min_temp())
            .with_max_temp(payload.max_temp())
            .with_status(BatchStatus::Created)
            .with_creation_timestamp(transaction_time(request)?)
            .build()
            .map_err(|err| {
                ApplyError::InvalidTransaction(format!("Cannot build vaccine batch: {}", err))
            })?;

        state.set_batch(batch)?;

        Ok(Response::Message(format!(
            "VaccineBatch with ID {} added successfully",
            batch_id
        )))
    }

    fn _read_batch(&self, batch_id: &str, state: &ColdChainState) -> Result<Response, ApplyError> {
        Ok(Response::Batch(require_batch(batch_id, state)?))
    }

    fn _delete_batch(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        if !state.batch_exists(batch_id)? {
            return Err(ApplyError::NotFound(format!(
                "The vaccine batch {} does not exist",
                batch_id
            )));
        }
        state.delete_batch(batch_id)?;
        Ok(Response::Empty)
    }

    fn _get_all_batch(&self, state: &ColdChainState) -> Result<Response, ApplyError> {
        Ok(Response::Batches(state.list_batches()?))
    }

    fn _deliver_to_transporter(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        let batch = require_batch(batch_id, state)?;
        if batch.status() != BatchStatus::Created {
            return Err(ApplyError::InvalidStateTransition(format!(
                "Cannot deliver batch {} as it is in {} state",
                batch_id,
                batch.status()
            )));
        }

        let batch = batch
            .into_builder()
            .with_status(BatchStatus::InTransit)
            .build()
            .map_err(|err| {
                ApplyError::InvalidTransaction(format!("Cannot build vaccine batch: {}", err))
            })?;
        state.set_batch(batch)?;

        Ok(Response::Message(format!(
            "Vaccine batch {} has been delivered to transporter",
            batch_id
        )))
    }

    fn _add_temperature_log(
        &self,
        payload: &AddTemperatureLogAction,
        state: &ColdChainState,
        request: &TransactionRequest,
    ) -> Result<Response, ApplyError> {
        let log = TemperatureLogBuilder::new()
            .with_batch_id(payload.batch_id().to_string())
            .with_temp_now(payload.temp_now())
            .with_timestamp(transaction_time(request)?)
            .build()
            .map_err(|err| {
                ApplyError::InvalidTransaction(format!("Cannot build temperature log: {}", err))
            })?;

        state.add_temperature_log(log)?;
        Ok(Response::Empty)
    }

    fn _get_temperature_log_history(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        let history = state.get_temperature_logs(batch_id)?;
        if history.skipped > 0 {
            debug!(
                "History of batch {}: {} entries, {} skipped",
                batch_id,
                history.logs.len(),
                history.skipped
            );
        }
        Ok(Response::History(
            history.logs.iter().map(ToString::to_string).collect(),
        ))
    }

    fn _verify_temperature_logs(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        let batch = require_batch(batch_id, state)?;
        let history = state.get_temperature_logs(batch_id)?;

        let verdict = match history
            .logs
            .iter()
            .find(|log| !batch.is_within_safe_range(log.temp_now()))
        {
            Some(log) => format!(
                "Not Verified: Temp {}°C out of range [{}°C, {}°C]",
                log.temp_now(),
                batch.min_temp(),
                batch.max_temp()
            ),
            None => format!(
                "Verified: All temperatures within safe range [{}°C, {}°C]",
                batch.min_temp(),
                batch.max_temp()
            ),
        };

        Ok(Response::Message(verdict))
    }

    fn _set_delivery_state(
        &self,
        batch_id: &str,
        delivery_state: DeliveryState,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        state.set_delivery_status(DeliveryStatus::new(batch_id.to_string(), delivery_state))?;
        Ok(Response::Empty)
    }

    fn _get_delivery_status(
        &self,
        batch_id: &str,
        state: &ColdChainState,
    ) -> Result<Response, ApplyError> {
        let message = match state.get_delivery_status(batch_id)? {
            Some(status) => format!("Batch {} is currently: {}", batch_id, status.status()),
            None => "No delivery status found".to_string(),
        };
        Ok(Response::Message(message))
    }
}

impl TransactionHandler for ColdChainTransactionHandler {
    type Response = Response;

    fn apply(
        &self,
        request: &TransactionRequest,
        context: &dyn TransactionContext,
    ) -> Result<Response, ApplyError> {
        let action = parse_action(request)?;

        self.policy.check(action.name(), request.creator())?;
        validate_payload(&action)?;

        let state = ColdChainState::new(context);

        info!(
            "Cold chain action: {:?} invoked by {}",
            action,
            request.creator()
        );

        match &action {
            Action::VaccineExists(batch_id) => self._vaccine_exists(batch_id, &state),
            Action::CreateBatch(action_payload) => {
                self._create_batch(action_payload, &state, request)
            }
            Action::ReadBatch(batch_id) => self._read_batch(batch_id, &state),
            Action::DeleteBatch(batch_id) => self._delete_batch(batch_id, &state),
            Action::GetAllBatch => self._get_all_batch(&state),
            Action::DeliverToTransporter(batch_id) => {
                self._deliver_to_transporter(batch_id, &state)
            }
            Action::AddTemperatureLog(action_payload) => {
                self._add_temperature_log(action_payload, &state, request)
            }
            Action::GetTemperatureLogHistory(batch_id) => {
                self._get_temperature_log_history(batch_id, &state)
            }
            Action::VerifyTemperatureLogs(batch_id) => {
                self._verify_temperature_logs(batch_id, &state)
            }
            Action::StartDelivery(batch_id) => {
                self._set_delivery_state(batch_id, DeliveryState::InTransit, &state)
            }
            Action::CompleteDelivery(batch_id) => {
                self._set_delivery_state(batch_id, DeliveryState::Delivered, &state)
            }
            Action::GetDeliveryStatus(batch_id) => self._get_delivery_status(batch_id, &state),
        }
    }
}

fn require_batch(batch_id: &str, state: &ColdChainState) -> Result<VaccineBatch, ApplyError> {
    state.get_batch(batch_id)?.ok_or_else(|| {
        ApplyError::NotFound(format!("No private data found for batch ID {}", batch_id))
    })
}

fn transient_field(request: &TransactionRequest, field: &str) -> Result<String, ApplyError> {
    let value = request
        .transient()
        .get(field)
        .ok_or_else(|| ApplyError::MissingTransientField(field.to_string()))?;
    String::from_utf8(value.clone()).map_err(|_| {
        ApplyError::InvalidTransaction(format!("Transient field {} is not valid UTF-8", field))
    })
}

fn transaction_time(request: &TransactionRequest) -> Result<String, ApplyError> {
    request.timestamp().to_rfc3339().map_err(|err| {
        ApplyError::InvalidTransaction(format!("Invalid transaction timestamp: {}", err))
    })
}
