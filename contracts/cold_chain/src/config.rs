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

use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::error::ConfigurationError;

pub const LEDGER_ENV: &str = "COLD_CHAIN_LEDGER";
const DEFAULT_LEDGER_PATH: &str = "cold-chain-ledger.json";

pub struct ColdChainConfig {
    ledger_path: PathBuf,
    log_level: LevelFilter,
}

impl ColdChainConfig {
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// Assembles a `ColdChainConfig` from defaults, then environment variables, then command line
/// arguments. Later sources win.
pub struct ColdChainConfigBuilder {
    ledger_path: Option<PathBuf>,
    log_level: Option<LevelFilter>,
}

impl Default for ColdChainConfigBuilder {
    fn default() -> Self {
        Self {
            ledger_path: Some(PathBuf::from(DEFAULT_LEDGER_PATH)),
            log_level: Some(LevelFilter::Warn),
        }
    }
}

impl ColdChainConfigBuilder {
    /// Applies environment variables, read through `lookup`.
    pub fn with_env<F>(&mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            ledger_path: lookup(LEDGER_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .or_else(|| self.ledger_path.take()),
            log_level: self.log_level.take(),
        }
    }

    pub fn with_cli_args(&mut self, matches: &clap::ArgMatches<'_>) -> Self {
        let log_level = if matches.is_present("quiet") {
            Some(LevelFilter::Error)
        } else {
            match matches.occurrences_of("verbose") {
                0 => None,
                1 => Some(LevelFilter::Info),
                2 => Some(LevelFilter::Debug),
                _ => Some(LevelFilter::Trace),
            }
        };

        Self {
            ledger_path: matches
                .value_of("ledger")
                .map(PathBuf::from)
                .or_else(|| self.ledger_path.take()),
            log_level: log_level.or_else(|| self.log_level.take()),
        }
    }

    pub fn build(mut self) -> Result<ColdChainConfig, ConfigurationError> {
        Ok(ColdChainConfig {
            ledger_path: self
                .ledger_path
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("ledger_path".to_owned()))?,
            log_level: self
                .log_level
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("log_level".to_owned()))?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_app<'a, 'b>() -> clap::App<'a, 'b> {
        clap::App::new("testapp")
            .arg(clap::Arg::with_name("ledger").long("ledger").takes_value(true))
            .arg(clap::Arg::with_name("verbose").short("v").multiple(true))
            .arg(clap::Arg::with_name("quiet").short("q"))
    }

    #[test]
    fn build_with_defaults() {
        let matches = test_app().get_matches_from(vec!["testapp"]);

        let config = ColdChainConfigBuilder::default()
            .with_env(|_| None)
            .with_cli_args(&matches)
            .build()
            .expect("Unable to build configuration");

        assert_eq!(Path::new("cold-chain-ledger.json"), config.ledger_path());
        assert_eq!(LevelFilter::Warn, config.log_level());
    }

    #[test]
    fn build_with_env() {
        let matches = test_app().get_matches_from(vec!["testapp", "-vv"]);

        let config = ColdChainConfigBuilder::default()
            .with_env(|key| {
                if key == LEDGER_ENV {
                    Some("/tmp/env-ledger.json".to_string())
                } else {
                    None
                }
            })
            .with_cli_args(&matches)
            .build()
            .expect("Unable to build configuration");

        assert_eq!(Path::new("/tmp/env-ledger.json"), config.ledger_path());
        assert_eq!(LevelFilter::Debug, config.log_level());
    }

    #[test]
    fn build_with_args_over_env() {
        let matches =
            test_app().get_matches_from(vec!["testapp", "--ledger", "cli.json", "-q", "-v"]);

        let config = ColdChainConfigBuilder::default()
            .with_env(|_| Some("env.json".to_string()))
            .with_cli_args(&matches)
            .build()
            .expect("Unable to build configuration");

        assert_eq!(Path::new("cli.json"), config.ledger_path());
        assert_eq!(LevelFilter::Error, config.log_level());
    }
}
