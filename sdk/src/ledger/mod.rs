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

//! The ledger access abstraction a smart contract runs against.
//!
//! A contract sees the ledger only through a [`TransactionContext`]: point reads and writes on
//! the public keyspace and on named private data collections, prefix scans over composite keys
//! and selector queries over a private collection. Everything a contract does within one
//! [`TransactionRequest`] commits atomically or not at all; that guarantee belongs to the
//! execution environment, modeled here by [`MemoryLedger`](memory::MemoryLedger).

mod composite_key;
mod context;
mod error;
mod handler;
pub mod memory;
mod request;

pub use composite_key::{create_composite_key, split_composite_key, COMPOSITE_KEY_NAMESPACE};
pub use context::{KeyValue, StateIterator, TransactionContext};
pub use error::{ApplyError, ContextError};
pub use handler::TransactionHandler;
pub use request::{TransactionRequest, TransactionRequestBuilder, TxTimestamp};
