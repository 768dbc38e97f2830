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

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use cold_chain_sdk::ledger::memory::{LedgerSnapshot, MemoryLedger};
use cold_chain_sdk::ledger::{TransactionRequest, TransactionRequestBuilder, TxTimestamp};
use cold_chain_tp::{ColdChainTransactionHandler, Response};
use serde::Deserialize;

use crate::error::CliError;

/// Loads the ledger snapshot at `path`. A missing file yields an empty ledger.
pub fn load_ledger(path: &Path) -> Result<MemoryLedger, CliError> {
    if !path.exists() {
        debug!("No ledger at {}, starting empty", path.display());
        return Ok(MemoryLedger::new());
    }
    let snapshot: LedgerSnapshot = serde_json::from_slice(&fs::read(path)?)?;
    debug!(
        "Loaded {} entries from {}",
        snapshot.entry_count(),
        path.display()
    );
    Ok(MemoryLedger::from_snapshot(&snapshot)?)
}

pub fn save_ledger(path: &Path, ledger: &MemoryLedger) -> Result<(), CliError> {
    let snapshot = ledger.snapshot()?;
    fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
    debug!(
        "Saved {} entries to {}",
        snapshot.entry_count(),
        path.display()
    );
    Ok(())
}

/// Parses `key=value` pairs into a transient map.
pub fn parse_transient<'a, I>(values: I) -> Result<HashMap<String, Vec<u8>>, CliError>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|value| {
            let mut parts = value.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    Ok((key.to_string(), value.as_bytes().to_vec()))
                }
                _ => Err(CliError::UserError(format!(
                    "Transient field must be formatted as key=value: {}",
                    value
                ))),
            }
        })
        .collect()
}

/// Text printed for a successful invocation, if any.
pub fn render_response(response: &Response) -> Result<Option<String>, CliError> {
    let rendered = match response {
        Response::Empty => None,
        Response::Exists(exists) => Some(exists.to_string()),
        Response::Message(message) => Some(message.clone()),
        Response::Batch(batch) => Some(batch.to_string()),
        Response::Batches(_) | Response::History(_) => {
            Some(serde_json::to_string_pretty(response)?)
        }
    };
    Ok(rendered)
}

fn build_request(
    org: &str,
    function: &str,
    args: Vec<String>,
    transient: HashMap<String, Vec<u8>>,
    timestamp: TxTimestamp,
) -> Result<TransactionRequest, CliError> {
    TransactionRequestBuilder::new()
        .with_creator(org.to_string())
        .with_function(function.to_string())
        .with_args(args)
        .with_transient(transient)
        .with_timestamp(timestamp)
        .build()
        .map_err(|err| CliError::UserError(format!("Cannot build transaction: {}", err)))
}

/// Executes one function against the ledger file, saving it only if the transaction succeeds.
pub fn do_invoke(
    ledger_path: &Path,
    org: &str,
    function: &str,
    args: Vec<String>,
    transient: HashMap<String, Vec<u8>>,
) -> Result<(), CliError> {
    let ledger = load_ledger(ledger_path)?;
    let request = build_request(org, function, args, transient, TxTimestamp::now())?;
    let response = ledger.execute(&ColdChainTransactionHandler::new(), &request)?;
    save_ledger(ledger_path, &ledger)?;

    if let Some(output) = render_response(&response)? {
        println!("{}", output);
    }
    Ok(())
}

/// One invocation in a replay scenario.
#[derive(Debug, Deserialize)]
pub struct ScenarioStep {
    org: String,
    function: String,
    #[serde(default)]
    args: Vec<serde_yaml::Value>,
    #[serde(default)]
    transient: BTreeMap<String, String>,
    timestamp: Option<i64>,
}

impl ScenarioStep {
    fn args(&self) -> Result<Vec<String>, CliError> {
        self.args
            .iter()
            .map(|value| match value {
                serde_yaml::Value::String(value) => Ok(value.clone()),
                serde_yaml::Value::Number(value) => Ok(value.to_string()),
                serde_yaml::Value::Bool(value) => Ok(value.to_string()),
                _ => Err(CliError::UserError(format!(
                    "Argument of {} must be a scalar: {:?}",
                    self.function, value
                ))),
            })
            .collect()
    }

    fn transient(&self) -> HashMap<String, Vec<u8>> {
        self.transient
            .iter()
            .map(|(key, value)| (key.clone(), value.as_bytes().to_vec()))
            .collect()
    }
}

pub fn load_scenario(path: &Path) -> Result<Vec<ScenarioStep>, CliError> {
    Ok(serde_yaml::from_slice(&fs::read(path)?)?)
}

#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs every step in order, writing each outcome to `out`. A failed step is reported and the
/// replay continues with the next one.
///
/// Steps without a timestamp run one second after the previous step, starting at `start`.
pub fn run_scenario(
    ledger: &MemoryLedger,
    steps: &[ScenarioStep],
    start: TxTimestamp,
    out: &mut dyn Write,
) -> Result<ReplaySummary, CliError> {
    let handler = ColdChainTransactionHandler::new();
    let mut summary = ReplaySummary::default();
    let mut clock = start.seconds();

    for (index, step) in steps.iter().enumerate() {
        let seconds = step.timestamp.unwrap_or(clock);

        info!("Step {}: {} as {}", index + 1, step.function, step.org);
        let outcome = match seconds.checked_add(1) {
            Some(next) => {
                clock = next;
                step.args().and_then(|args| {
                    let request = build_request(
                        &step.org,
                        &step.function,
                        args,
                        step.transient(),
                        TxTimestamp::new(seconds, 0),
                    )?;
                    Ok(ledger.execute(&handler, &request)?)
                })
            }
            None => Err(CliError::UserError(format!(
                "Timestamp {} is out of range",
                seconds
            ))),
        };

        match outcome {
            Ok(response) => {
                summary.succeeded += 1;
                match render_response(&response)? {
                    Some(output) => writeln!(out, "[{}] {}: {}", index + 1, step.function, output)?,
                    None => writeln!(out, "[{}] {}: ok", index + 1, step.function)?,
                }
            }
            Err(err) => {
                summary.failed += 1;
                writeln!(out, "[{}] {} failed: {}", index + 1, step.function, err)?;
            }
        }
    }

    Ok(summary)
}

pub fn do_replay(ledger_path: &Path, scenario_path: &Path) -> Result<(), CliError> {
    let ledger = load_ledger(ledger_path)?;
    let steps = load_scenario(scenario_path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_scenario(&ledger, &steps, TxTimestamp::now(), &mut out)?;
    save_ledger(ledger_path, &ledger)?;

    info!(
        "Replayed {} steps: {} succeeded, {} failed",
        steps.len(),
        summary.succeeded,
        summary.failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SCENARIO: &str = r#"
- org: Org1MSP
  function: CreateBatch
  args: [B1, "2021-05-01", "2022-05-01", 2, 8]
  transient:
    manufacturer: Acme
    vaccineType: mRNA
  timestamp: 1622541600
- org: Org3MSP
  function: AddTemperatureLog
  args: [B1, 4]
- org: Org3MSP
  function: AddTemperatureLog
  args: [B1, 9]
- org: Org2MSP
  function: CreateBatch
  args: [B2, "2021-05-01", "2022-05-01", 2, 8]
- org: Org2MSP
  function: VerifyTemperatureLogs
  args: [B1]
- org: Org1MSP
  function: GetTemperatureLogHistory
  args: [B1]
"#;

    #[test]
    // Test that a replay reports each step and keeps going after a failure
    fn test_run_scenario() {
        let steps: Vec<ScenarioStep> = serde_yaml::from_str(SCENARIO).unwrap();
        let ledger = MemoryLedger::new();
        let mut out = Vec::new();

        let summary = run_scenario(&ledger, &steps, TxTimestamp::new(0, 0), &mut out).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                succeeded: 5,
                failed: 1
            }
        );

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "[1] CreateBatch: VaccineBatch with ID B1 added successfully");
        assert_eq!(lines[1], "[2] AddTemperatureLog: ok");
        assert!(lines[3].starts_with("[4] CreateBatch failed: Transaction failed: AccessDenied"));
        assert_eq!(
            lines[4],
            "[5] VerifyTemperatureLogs: Not Verified: Temp 9°C out of range [2°C, 8°C]"
        );
        assert!(output.contains("Temp: 4°C at 2021-06-01T10:00:01Z"));
        assert!(output.contains("Temp: 9°C at 2021-06-01T10:00:02Z"));
    }

    #[test]
    // Test that a step at the largest timestamp fails on its own and the replay continues
    fn test_run_scenario_timestamp_overflow() {
        let steps: Vec<ScenarioStep> = serde_yaml::from_str(
            r#"
- org: Org3MSP
  function: StartDelivery
  args: [B1]
  timestamp: 9223372036854775807
- org: Org3MSP
  function: CompleteDelivery
  args: [B1]
- org: Org2MSP
  function: GetDeliveryStatus
  args: [B1]
"#,
        )
        .unwrap();
        let ledger = MemoryLedger::new();
        let mut out = Vec::new();

        let summary =
            run_scenario(&ledger, &steps, TxTimestamp::new(1_622_541_600, 0), &mut out).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                succeeded: 2,
                failed: 1
            }
        );

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "[1] StartDelivery failed: Error: Timestamp 9223372036854775807 is out of range"
        );
        assert_eq!(lines[2], "[3] GetDeliveryStatus: Batch B1 is currently: Delivered");
    }

    #[test]
    // Test that a ledger survives a save and load
    fn test_save_and_load_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let ledger = load_ledger(&path).unwrap();
        assert_eq!(ledger.snapshot().unwrap().entry_count(), 0);

        let steps: Vec<ScenarioStep> = serde_yaml::from_str(SCENARIO).unwrap();
        run_scenario(&ledger, &steps, TxTimestamp::new(0, 0), &mut Vec::new()).unwrap();
        save_ledger(&path, &ledger).unwrap();

        let restored = load_ledger(&path).unwrap();
        assert_eq!(restored.snapshot().unwrap(), ledger.snapshot().unwrap());
        assert_eq!(restored.snapshot().unwrap().entry_count(), 3);
    }

    #[test]
    // Test that invoke only persists successful transactions
    fn test_do_invoke_persists_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        match do_invoke(&path, "Org2MSP", "DeleteBatch", vec!["B1".to_string()], HashMap::new()) {
            Err(CliError::TransactionError(_)) => (),
            res => panic!("Expected TransactionError, got {:?}", res),
        }
        assert!(!path.exists());

        let transient = parse_transient(vec!["manufacturer=Acme", "vaccineType=mRNA"]).unwrap();
        do_invoke(
            &path,
            "Org1MSP",
            "CreateBatch",
            vec!["B1", "2021-05-01", "2022-05-01", "-20", "-10"]
                .into_iter()
                .map(String::from)
                .collect(),
            transient,
        )
        .unwrap();

        let ledger = load_ledger(&path).unwrap();
        assert!(ledger
            .get_private_data("BatchCollection", "B1")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_parse_transient() {
        let transient = parse_transient(vec!["manufacturer=Acme=Corp"]).unwrap();
        assert_eq!(transient["manufacturer"], b"Acme=Corp".to_vec());

        match parse_transient(vec!["manufacturer"]) {
            Err(CliError::UserError(_)) => (),
            res => panic!("Expected UserError, got {:?}", res),
        }
    }

    #[test]
    fn test_render_response() {
        assert_eq!(render_response(&Response::Empty).unwrap(), None);
        assert_eq!(
            render_response(&Response::Exists(false)).unwrap(),
            Some("false".to_string())
        );
        assert_eq!(
            render_response(&Response::History(vec!["Temp: 5°C at now".to_string()])).unwrap(),
            Some("[\n  \"Temp: 5°C at now\"\n]".to_string())
        );
    }
}
