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

use std::error::Error;
use std::fmt;
use std::io;

use cold_chain_sdk::ledger::{ApplyError, ContextError};

#[derive(Debug)]
pub enum CliError {
    LoggingInitializationError(Box<flexi_logger::FlexiLoggerError>),
    ConfigurationError(Box<ConfigurationError>),
    UserError(String),
    IoError(io::Error),
    LedgerError(ContextError),
    SerdeJsonError(serde_json::Error),
    SerdeYamlError(serde_yaml::Error),
    TransactionError(ApplyError),
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::LoggingInitializationError(err) => Some(err),
            CliError::ConfigurationError(err) => Some(err),
            CliError::UserError(_) => None,
            CliError::IoError(err) => Some(err),
            CliError::LedgerError(err) => Some(err),
            CliError::SerdeJsonError(err) => Some(err),
            CliError::SerdeYamlError(err) => Some(err),
            CliError::TransactionError(err) => Some(err),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::LoggingInitializationError(ref err) => {
                write!(f, "LoggingInitializationError: {}", err)
            }
            CliError::ConfigurationError(ref err) => write!(f, "ConfigurationError: {}", err),
            CliError::UserError(ref err) => write!(f, "Error: {}", err),
            CliError::IoError(ref err) => write!(f, "IoError: {}", err),
            CliError::LedgerError(ref err) => write!(f, "LedgerError: {}", err),
            CliError::SerdeJsonError(ref err) => write!(f, "SerdeJsonError: {}", err),
            CliError::SerdeYamlError(ref err) => write!(f, "SerdeYamlError: {}", err),
            CliError::TransactionError(ref err) => write!(f, "Transaction failed: {}", err),
        }
    }
}

impl From<flexi_logger::FlexiLoggerError> for CliError {
    fn from(err: flexi_logger::FlexiLoggerError) -> Self {
        CliError::LoggingInitializationError(Box::new(err))
    }
}

impl From<ConfigurationError> for CliError {
    fn from(err: ConfigurationError) -> Self {
        CliError::ConfigurationError(Box::new(err))
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::IoError(err)
    }
}

impl From<ContextError> for CliError {
    fn from(err: ContextError) -> Self {
        CliError::LedgerError(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerdeJsonError(err)
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::SerdeYamlError(err)
    }
}

impl From<ApplyError> for CliError {
    fn from(err: ApplyError) -> Self {
        CliError::TransactionError(err)
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigurationError {
    MissingValue(String),
}

impl Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::MissingValue(config_field_name) => {
                write!(f, "Missing configuration for {}", config_field_name)
            }
        }
    }
}
