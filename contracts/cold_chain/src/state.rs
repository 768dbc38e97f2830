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

use cold_chain_sdk::{
    cold_chain::addressing::*,
    ledger::{ApplyError, TransactionContext},
    protocol::{
        cold_chain::state::{DeliveryStatus, TemperatureLog, VaccineBatch},
        FromBytes, IntoBytes,
    },
};

/// Temperature logs recovered for one batch, in key order.
///
/// Entries that could not be decoded are left out and counted in `skipped`.
#[derive(Debug, Default, PartialEq)]
pub struct TemperatureLogHistory {
    pub logs: Vec<TemperatureLog>,
    pub skipped: usize,
}

pub struct ColdChainState<'a> {
    context: &'a dyn TransactionContext,
}

impl<'a> ColdChainState<'a> {
    pub fn new(context: &'a dyn TransactionContext) -> ColdChainState {
        ColdChainState { context }
    }

    pub fn batch_exists(&self, batch_id: &str) -> Result<bool, ApplyError> {
        Ok(self
            .context
            .get_private_data(BATCH_COLLECTION, batch_id)?
            .is_some())
    }

    pub fn get_batch(&self, batch_id: &str) -> Result<Option<VaccineBatch>, ApplyError> {
        debug!("Reading batch {} from {}", batch_id, BATCH_COLLECTION);
        match self.context.get_private_data(BATCH_COLLECTION, batch_id)? {
            Some(packed) => match VaccineBatch::from_bytes(packed.as_slice()) {
                Ok(batch) => Ok(Some(batch)),
                Err(err) => Err(ApplyError::SerializationError(format!(
                    "Cannot deserialize vaccine batch {}: {}",
                    batch_id, err
                ))),
            },
            None => Ok(None),
        }
    }

    pub fn set_batch(&self, batch: VaccineBatch) -> Result<(), ApplyError> {
        let batch_id = batch.batch_id().to_string();
        let serialized = batch.into_bytes().map_err(|err| {
            ApplyError::SerializationError(format!("Cannot serialize vaccine batch: {}", err))
        })?;
        debug!("Writing batch {} to {}", batch_id, BATCH_COLLECTION);
        self.context
            .put_private_data(BATCH_COLLECTION, batch_id, serialized)?;
        Ok(())
    }

    pub fn delete_batch(&self, batch_id: &str) -> Result<(), ApplyError> {
        debug!("Deleting batch {} from {}", batch_id, BATCH_COLLECTION);
        self.context.delete_private_data(BATCH_COLLECTION, batch_id)?;
        Ok(())
    }

    /// Every vaccine batch in the collection. A record that cannot be decoded aborts the listing.
    pub fn list_batches(&self) -> Result<Vec<VaccineBatch>, ApplyError> {
        let results = self
            .context
            .get_private_data_query_result(BATCH_COLLECTION, &batch_selector_query())?;

        let mut batches = Vec::new();
        for result in results {
            let (key, packed) = result?;
            let batch = VaccineBatch::from_bytes(packed.as_slice()).map_err(|err| {
                ApplyError::SerializationError(format!(
                    "Cannot deserialize vaccine batch {}: {}",
                    key, err
                ))
            })?;
            batches.push(batch);
        }
        Ok(batches)
    }

    pub fn add_temperature_log(&self, log: TemperatureLog) -> Result<(), ApplyError> {
        let address = compute_temperature_log_address(log.batch_id(), log.timestamp())?;
        let serialized = log.into_bytes().map_err(|err| {
            ApplyError::SerializationError(format!("Cannot serialize temperature log: {}", err))
        })?;
        self.context.set_state_entry(address, serialized)?;
        Ok(())
    }

    pub fn get_temperature_logs(
        &self,
        batch_id: &str,
    ) -> Result<TemperatureLogHistory, ApplyError> {
        let results = self
            .context
            .get_state_by_partial_composite_key(TEMPERATURE_LOG_OBJECT_TYPE, &[batch_id])?;

        let mut history = TemperatureLogHistory::default();
        for result in results {
            let (key, packed) = result?;
            match TemperatureLog::from_bytes(packed.as_slice()) {
                Ok(log) => history.logs.push(log),
                Err(err) => {
                    warn!(
                        "Skipping malformed temperature log {:?} for batch {}: {}",
                        key, batch_id, err
                    );
                    history.skipped += 1;
                }
            }
        }
        Ok(history)
    }

    pub fn get_delivery_status(
        &self,
        batch_id: &str,
    ) -> Result<Option<DeliveryStatus>, ApplyError> {
        let address = compute_delivery_status_address(batch_id);
        match self.context.get_state_entry(&address)? {
            Some(packed) => match DeliveryStatus::from_bytes(packed.as_slice()) {
                Ok(status) => Ok(Some(status)),
                Err(err) => Err(ApplyError::SerializationError(format!(
                    "Cannot deserialize delivery status {}: {}",
                    address, err
                ))),
            },
            None => Ok(None),
        }
    }

    pub fn set_delivery_status(&self, status: DeliveryStatus) -> Result<(), ApplyError> {
        let address = compute_delivery_status_address(status.batch_id());
        let serialized = status.into_bytes().map_err(|err| {
            ApplyError::SerializationError(format!("Cannot serialize delivery status: {}", err))
        })?;
        debug!("Writing delivery status {}", address);
        self.context.set_state_entry(address, serialized)?;
        Ok(())
    }
}
