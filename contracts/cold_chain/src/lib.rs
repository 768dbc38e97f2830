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

//! The cold chain vaccine tracking contract.
//!
//! Manufacturers create vaccine batches in a private collection, transporters append
//! temperature readings to the public keyspace, and inspectors verify those readings against
//! each batch's safe temperature range.

#[macro_use]
extern crate log;

pub mod handler;
pub mod payload;
pub mod permissions;
pub mod state;

pub use handler::{ColdChainTransactionHandler, Response};
