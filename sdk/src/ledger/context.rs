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

use super::error::ContextError;

/// A key and the raw bytes stored under it.
pub type KeyValue = (String, Vec<u8>);

/// A finite, lazily consumed sequence of query results.
///
/// Iterators hold a cursor on the ledger until they are dropped, so a contract releases the
/// cursor on every exit path simply by letting the iterator go out of scope.
pub type StateIterator<'a> = Box<dyn Iterator<Item = Result<KeyValue, ContextError>> + 'a>;

/// The capabilities a contract may use while executing one transaction.
///
/// Reads observe the transaction's own pending writes. None of the writes are visible to other
/// transactions until the execution environment commits them, and they are discarded if the
/// contract returns an error.
pub trait TransactionContext {
    fn get_state_entry(&self, key: &str) -> Result<Option<Vec<u8>>, ContextError>;

    fn set_state_entry(&self, key: String, value: Vec<u8>) -> Result<(), ContextError>;

    fn delete_state_entry(&self, key: &str) -> Result<(), ContextError>;

    /// Returns every public entry whose composite key starts with `object_type` followed by
    /// `attributes`, in ascending key order.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<StateIterator<'_>, ContextError>;

    fn get_private_data(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, ContextError>;

    fn put_private_data(
        &self,
        collection: &str,
        key: String,
        value: Vec<u8>,
    ) -> Result<(), ContextError>;

    fn delete_private_data(&self, collection: &str, key: &str) -> Result<(), ContextError>;

    /// Runs a rich query of the form `{"selector": {"field": value, ...}}` over a private
    /// collection. Entries that are not JSON objects never match.
    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<StateIterator<'_>, ContextError>;
}
