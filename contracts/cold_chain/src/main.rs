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

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

mod actions;
mod config;
mod error;

use std::path::Path;

use flexi_logger::{DeferredNow, LogSpecBuilder, Logger};
use log::Record;

use crate::config::ColdChainConfigBuilder;
use crate::error::CliError;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

// log format for cli that will only show the log message
pub fn log_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(w, "{}", record.args(),)
}

fn run() -> Result<(), CliError> {
    let matches = clap_app!(myapp =>
        (name: APP_NAME)
        (version: VERSION)
        (author: "Cargill Incorporated")
        (about: "Command line for the cold chain vaccine tracking contract")
        (@setting SubcommandRequiredElseHelp)
        (@arg verbose: -v +multiple +global "Log verbosely")
        (@arg quiet: -q --quiet +global conflicts_with[verbose] "Only log errors")
        (@arg ledger: --ledger +takes_value +global
            "Path of the ledger snapshot file (defaults to $COLD_CHAIN_LEDGER)")
        (@subcommand invoke =>
            (about: "Execute one contract function as a transaction")
            (@setting AllowNegativeNumbers)
            (@arg org: --org +takes_value +required "MSP ID of the invoking organization")
            (@arg transient: --transient +takes_value +multiple number_of_values(1)
                "Transient field formatted as key=value")
            (@arg function: +required "Contract function to invoke")
            (@arg args: +multiple "Positional arguments of the function")
        )
        (@subcommand replay =>
            (about: "Execute every invocation listed in a YAML scenario file")
            (@arg scenario: +required "Path of the scenario file")
        )
    )
    .get_matches();

    let config = ColdChainConfigBuilder::default()
        .with_env(|key| std::env::var(key).ok())
        .with_cli_args(&matches)
        .build()?;

    let mut log_spec_builder = LogSpecBuilder::new();
    log_spec_builder.default(config.log_level());

    Logger::with(log_spec_builder.build())
        .format(log_format)
        .start()?;

    match matches.subcommand() {
        ("invoke", Some(m)) => {
            let org = m
                .value_of("org")
                .ok_or_else(|| CliError::UserError("An organization is required".into()))?;
            let function = m
                .value_of("function")
                .ok_or_else(|| CliError::UserError("A function is required".into()))?;
            let args = m
                .values_of("args")
                .map(|values| values.map(String::from).collect())
                .unwrap_or_default();
            let transient = actions::parse_transient(
                m.values_of("transient")
                    .map(|values| values.collect::<Vec<_>>())
                    .unwrap_or_default(),
            )?;

            actions::do_invoke(config.ledger_path(), org, function, args, transient)
        }
        ("replay", Some(m)) => {
            let scenario = m
                .value_of("scenario")
                .ok_or_else(|| CliError::UserError("A scenario file is required".into()))?;
            actions::do_replay(config.ledger_path(), Path::new(scenario))
        }
        _ => Err(CliError::UserError("Subcommand not recognized".into())),
    }
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
