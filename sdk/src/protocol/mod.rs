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

//! Native representations of everything the cold chain contract reads from and writes to the
//! ledger, plus the actions it accepts.

pub mod cold_chain;
pub mod errors;

use std::error::Error;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

/// Returned when a record cannot be converted to or from its stored JSON form.
#[derive(Debug)]
pub struct ConversionError(serde_json::Error);

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConversionError: {}", self.0)
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError(err)
    }
}

pub trait FromBytes<T>: Sized {
    fn from_bytes(bytes: &[u8]) -> Result<T, ConversionError>;
}

pub trait IntoBytes: Sized {
    fn into_bytes(self) -> Result<Vec<u8>, ConversionError>;
}

impl<T: DeserializeOwned> FromBytes<T> for T {
    fn from_bytes(bytes: &[u8]) -> Result<T, ConversionError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<T: Serialize> IntoBytes for T {
    fn into_bytes(self) -> Result<Vec<u8>, ConversionError> {
        Ok(serde_json::to_vec(&self)?)
    }
}
