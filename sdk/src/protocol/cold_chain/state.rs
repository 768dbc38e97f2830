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

use std::fmt;

use crate::cold_chain::addressing::{TEMPERATURE_LOG_ASSET_TYPE, VACCINE_BATCH_DOC_TYPE};
use crate::protocol::errors::BuilderError;

/// Lifecycle of a vaccine batch record. The only transition is `Created -> InTransit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    #[serde(rename = "Created")]
    Created,
    #[serde(rename = "In-transit")]
    InTransit,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BatchStatus::Created => write!(f, "Created"),
            BatchStatus::InTransit => write!(f, "In-transit"),
        }
    }
}

/// A batch of vaccine, kept in the private batch collection.
///
/// `manufacturer` and `vaccine_type` arrive through transient data only, so they never appear in
/// the replicated transaction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineBatch {
    #[serde(rename = "docType")]
    doc_type: String,
    #[serde(rename = "batchID")]
    batch_id: String,
    manufacturer: String,
    #[serde(rename = "vaccineType")]
    vaccine_type: String,
    #[serde(rename = "manufactureDate")]
    manufacture_date: String,
    #[serde(rename = "expiryDate")]
    expiry_date: String,
    #[serde(rename = "minTemp")]
    min_temp: i32,
    #[serde(rename = "maxTemp")]
    max_temp: i32,
    status: BatchStatus,
    #[serde(rename = "creationTimestamp")]
    creation_timestamp: String,
}

impl VaccineBatch {
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }
    pub fn vaccine_type(&self) -> &str {
        &self.vaccine_type
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
    pub fn status(&self) -> BatchStatus {
        self.status
    }
    pub fn creation_timestamp(&self) -> &str {
        &self.creation_timestamp
    }

    /// True if `temperature` lies within the batch's inclusive safe range.
    pub fn is_within_safe_range(&self, temperature: i32) -> bool {
        self.min_temp <= temperature && temperature <= self.max_temp
    }

    pub fn into_builder(self) -> VaccineBatchBuilder {
        VaccineBatchBuilder::new()
            .with_batch_id(self.batch_id)
            .with_manufacturer(self.manufacturer)
            .with_vaccine_type(self.vaccine_type)
            .with_manufacture_date(self.manufacture_date)
            .with_expiry_date(self.expiry_date)
            .with_min_temp(self.min_temp)
            .with_max_temp(self.max_temp)
            .with_status(self.status)
            .with_creation_timestamp(self.creation_timestamp)
    }
}

impl fmt::Display for VaccineBatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Batch ID: {}", self.batch_id)?;
        writeln!(f, "Manufacturer: {}", self.manufacturer)?;
        writeln!(f, "Vaccine Type: {}", self.vaccine_type)?;
        writeln!(f, "Manufacture Date: {}", self.manufacture_date)?;
        writeln!(f, "Expiry Date: {}", self.expiry_date)?;
        writeln!(
            f,
            "Temperature Range: {}°C to {}°C",
            self.min_temp, self.max_temp
        )?;
        write!(f, "Status: {}", self.status)
    }
}

#[derive(Default, Debug, Clone)]
pub struct VaccineBatchBuilder {
    batch_id: Option<String>,
    manufacturer: Option<String>,
    vaccine_type: Option<String>,
    manufacture_date: Option<String>,
    expiry_date: Option<String>,
    min_temp: Option<i32>,
    max_temp: Option<i32>,
    status: Option<BatchStatus>,
    creation_timestamp: Option<String>,
}

impl VaccineBatchBuilder {
    pub fn new() -> Self {
        VaccineBatchBuilder::default()
    }
    pub fn with_batch_id(mut self, value: String) -> Self {
        self.batch_id = Some(value);
        self
    }
    pub fn with_manufacturer(mut self, value: String) -> Self {
        self.manufacturer = Some(value);
        self
    }
    pub fn with_vaccine_type(mut self, value: String) -> Self {
        self.vaccine_type = Some(value);
        self
    }
    pub fn with_manufacture_date(mut self, value: String) -> Self {
        self.manufacture_date = Some(value);
        self
    }
    pub fn with_expiry_date(mut self, value: String) -> Self {
        self.expiry_date = Some(value);
        self
    }
    pub fn with_min_temp(mut self, value: i32) -> Self {
        self.min_temp = Some(value);
        self
    }
    pub fn with_max_temp(mut self, value: i32) -> Self {
        self.max_temp = Some(value);
        self
    }
    pub fn with_status(mut self, value: BatchStatus) -> Self {
        self.status = Some(value);
        self
    }
    pub fn with_creation_timestamp(mut self, value: String) -> Self {
        self.creation_timestamp = Some(value);
        self
    }
    pub fn build(self) -> Result<VaccineBatch, BuilderError> {
        let batch_id = self
            .batch_id
            .ok_or_else(|| BuilderError::MissingField("batch_id".into()))?;
        let manufacturer = self
            .manufacturer
            .ok_or_else(|| BuilderError::MissingField("manufacturer".into()))?;
        let vaccine_type = self
            .vaccine_type
            .ok_or_else(|| BuilderError::MissingField("vaccine_type".into()))?;
        let manufacture_date = self
            .manufacture_date
            .ok_or_else(|| BuilderError::MissingField("manufacture_date".into()))?;
        let expiry_date = self
            .expiry_date
            .ok_or_else(|| BuilderError::MissingField("expiry_date".into()))?;
        let min_temp = self
            .min_temp
            .ok_or_else(|| BuilderError::MissingField("min_temp".into()))?;
        let max_temp = self
            .max_temp
            .ok_or_else(|| BuilderError::MissingField("max_temp".into()))?;
        let status = self.status.unwrap_or(BatchStatus::Created);
        let creation_timestamp = self
            .creation_timestamp
            .ok_or_else(|| BuilderError::MissingField("creation_timestamp".into()))?;

        if min_temp > max_temp {
            return Err(BuilderError::InvalidField(format!(
                "min_temp {} is greater than max_temp {}",
                min_temp, max_temp
            )));
        }

        Ok(VaccineBatch {
            doc_type: VACCINE_BATCH_DOC_TYPE.to_string(),
            batch_id,
            manufacturer,
            vaccine_type,
            manufacture_date,
            expiry_date,
            min_temp,
            max_temp,
            status,
            creation_timestamp,
        })
    }
}

/// One temperature reading reported by the transporter. Readings are written once and never
/// updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLog {
    #[serde(rename = "assettype")]
    asset_type: String,
    #[serde(rename = "batchID")]
    batch_id: String,
    #[serde(rename = "tempnow")]
    temp_now: i32,
    timestamp: String,
}

impl TemperatureLog {
    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
    pub fn temp_now(&self) -> i32 {
        self.temp_now
    }
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Renders the reading the way it is shown to callers, e.g. `Temp: 5°C at 2021-06-01T10:00:00Z`.
impl fmt::Display for TemperatureLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Temp: {}°C at {}", self.temp_now, self.timestamp)
    }
}

#[derive(Default, Debug, Clone)]
pub struct TemperatureLogBuilder {
    batch_id: Option<String>,
    temp_now: Option<i32>,
    timestamp: Option<String>,
}

impl TemperatureLogBuilder {
    pub fn new() -> Self {
        TemperatureLogBuilder::default()
    }
    pub fn with_batch_id(mut self, value: String) -> Self {
        self.batch_id = Some(value);
        self
    }
    pub fn with_temp_now(mut self, value: i32) -> Self {
        self.temp_now = Some(value);
        self
    }
    pub fn with_timestamp(mut self, value: String) -> Self {
        self.timestamp = Some(value);
        self
    }
    pub fn build(self) -> Result<TemperatureLog, BuilderError> {
        let batch_id = self
            .batch_id
            .ok_or_else(|| BuilderError::MissingField("batch_id".into()))?;
        let temp_now = self
            .temp_now
            .ok_or_else(|| BuilderError::MissingField("temp_now".into()))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| BuilderError::MissingField("timestamp".into()))?;

        Ok(TemperatureLog {
            asset_type: TEMPERATURE_LOG_ASSET_TYPE.to_string(),
            batch_id,
            temp_now,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    #[serde(rename = "In-Transit")]
    InTransit,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DeliveryState::InTransit => write!(f, "In-Transit"),
            DeliveryState::Delivered => write!(f, "Delivered"),
        }
    }
}

/// Shared delivery progress of a batch, kept in the public keyspace. It is tracked
/// independently of the batch record's own status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    #[serde(rename = "batchID")]
    batch_id: String,
    status: DeliveryState,
}

impl DeliveryStatus {
    pub fn new(batch_id: String, status: DeliveryState) -> Self {
        DeliveryStatus { batch_id, status }
    }
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
    pub fn status(&self) -> DeliveryState {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::protocol::{FromBytes, IntoBytes};

    fn make_batch() -> VaccineBatch {
        VaccineBatchBuilder::new()
            .with_batch_id("B1".to_string())
            .with_manufacturer("Acme Biologics".to_string())
            .with_vaccine_type("mRNA".to_string())
            .with_manufacture_date("2021-05-01".to_string())
            .with_expiry_date("2022-05-01".to_string())
            .with_min_temp(2)
            .with_max_temp(8)
            .with_creation_timestamp("2021-06-01T10:00:00Z".to_string())
            .build()
            .expect("Failed to build vaccine batch")
    }

    #[test]
    // Test that a built batch starts in Created and carries the batch doc type
    fn test_vaccine_batch_builder() {
        let batch = make_batch();

        assert_eq!(batch.doc_type(), "vaccineBatch");
        assert_eq!(batch.batch_id(), "B1");
        assert_eq!(batch.status(), BatchStatus::Created);
        assert_eq!(batch.min_temp(), 2);
        assert_eq!(batch.max_temp(), 8);
    }

    #[test]
    fn test_vaccine_batch_builder_missing_field() {
        match VaccineBatchBuilder::new()
            .with_batch_id("B1".to_string())
            .build()
        {
            Err(BuilderError::MissingField(field)) => assert_eq!(field, "manufacturer"),
            res => panic!("Expected MissingField, got {:?}", res),
        }
    }

    #[test]
    fn test_vaccine_batch_builder_inverted_range() {
        let result = make_batch().into_builder().with_min_temp(9).build();
        match result {
            Err(BuilderError::InvalidField(_)) => (),
            res => panic!("Expected InvalidField, got {:?}", res),
        }
    }

    #[test]
    // Test that the stored JSON uses the field names other ledger clients expect
    fn test_vaccine_batch_json_layout() {
        let batch = make_batch()
            .into_builder()
            .with_status(BatchStatus::InTransit)
            .build()
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&batch.clone().into_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "docType": "vaccineBatch",
                "batchID": "B1",
                "manufacturer": "Acme Biologics",
                "vaccineType": "mRNA",
                "manufactureDate": "2021-05-01",
                "expiryDate": "2022-05-01",
                "minTemp": 2,
                "maxTemp": 8,
                "status": "In-transit",
                "creationTimestamp": "2021-06-01T10:00:00Z"
            })
        );
        assert_eq!(
            VaccineBatch::from_bytes(&batch.clone().into_bytes().unwrap()).unwrap(),
            batch
        );
    }

    #[test]
    fn test_vaccine_batch_display() {
        assert_eq!(
            make_batch().to_string(),
            "Batch ID: B1\n\
             Manufacturer: Acme Biologics\n\
             Vaccine Type: mRNA\n\
             Manufacture Date: 2021-05-01\n\
             Expiry Date: 2022-05-01\n\
             Temperature Range: 2°C to 8°C\n\
             Status: Created"
        );
    }

    #[test]
    fn test_safe_range_is_inclusive() {
        let batch = make_batch();
        assert!(batch.is_within_safe_range(2));
        assert!(batch.is_within_safe_range(8));
        assert!(!batch.is_within_safe_range(1));
        assert!(!batch.is_within_safe_range(9));
    }

    #[test]
    fn test_temperature_log_json_and_display() {
        let log = TemperatureLogBuilder::new()
            .with_batch_id("B1".to_string())
            .with_temp_now(5)
            .with_timestamp("2021-06-01T10:00:00Z".to_string())
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&log).unwrap(),
            json!({
                "assettype": "TemperatureLog",
                "batchID": "B1",
                "tempnow": 5,
                "timestamp": "2021-06-01T10:00:00Z"
            })
        );
        assert_eq!(log.to_string(), "Temp: 5°C at 2021-06-01T10:00:00Z");
    }

    #[test]
    fn test_delivery_status_json() {
        let status = DeliveryStatus::new("B1".to_string(), DeliveryState::InTransit);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"batchID": "B1", "status": "In-Transit"})
        );
        let stored = br#"{"batchID":"B1","status":"Delivered"}"#;
        assert_eq!(
            DeliveryStatus::from_bytes(stored).unwrap().status(),
            DeliveryState::Delivered
        );
    }

    #[test]
    fn test_unknown_status_does_not_decode() {
        assert!(DeliveryStatus::from_bytes(br#"{"batchID":"B1","status":"Lost"}"#).is_err());
    }
}
