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

//! An in-memory, transactional reference ledger.
//!
//! Transactions are executed one at a time. Each runs against a [`MemoryTransactionContext`]
//! that buffers its writes; the buffer is committed only when the contract returns `Ok`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::composite_key::create_composite_key;
use super::context::{KeyValue, StateIterator, TransactionContext};
use super::error::{ApplyError, ContextError};
use super::handler::TransactionHandler;
use super::request::TransactionRequest;
use crate::error::InternalError;

type Entries = BTreeMap<String, Vec<u8>>;
type PendingEntries = BTreeMap<String, Option<Vec<u8>>>;

#[derive(Debug, Clone, Default, PartialEq)]
struct LedgerState {
    public: Entries,
    private: BTreeMap<String, Entries>,
}

impl LedgerState {
    fn commit(&mut self, write_set: WriteSet) {
        apply_writes(&mut self.public, write_set.public);
        for (collection, writes) in write_set.private {
            let entries = self.private.entry(collection.clone()).or_default();
            apply_writes(entries, writes);
            if entries.is_empty() {
                self.private.remove(&collection);
            }
        }
    }
}

fn apply_writes(entries: &mut Entries, writes: PendingEntries) {
    for (key, value) in writes {
        match value {
            Some(value) => {
                entries.insert(key, value);
            }
            None => {
                entries.remove(&key);
            }
        }
    }
}

/// Pending writes of one transaction. `None` marks a delete.
#[derive(Debug, Default)]
struct WriteSet {
    public: PendingEntries,
    private: BTreeMap<String, PendingEntries>,
}

/// A serializable copy of the committed ledger contents. Values are base64 encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    public: BTreeMap<String, String>,
    #[serde(default)]
    private: BTreeMap<String, BTreeMap<String, String>>,
}

impl LedgerSnapshot {
    /// Number of committed entries across the public keyspace and all collections.
    pub fn entry_count(&self) -> usize {
        self.public.len() + self.private.values().map(BTreeMap::len).sum::<usize>()
    }
}

#[derive(Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<Mutex<LedgerState>>,
    open_iterators: Arc<AtomicUsize>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    /// Restores a ledger from a snapshot taken with [`MemoryLedger::snapshot`].
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, ContextError> {
        let mut state = LedgerState {
            public: decode_entries(&snapshot.public)?,
            private: BTreeMap::new(),
        };
        for (collection, entries) in &snapshot.private {
            state
                .private
                .insert(collection.clone(), decode_entries(entries)?);
        }

        Ok(MemoryLedger {
            inner: Arc::new(Mutex::new(state)),
            open_iterators: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, ContextError> {
        let state = self.lock()?;
        Ok(LedgerSnapshot {
            public: encode_entries(&state.public),
            private: state
                .private
                .iter()
                .map(|(collection, entries)| (collection.clone(), encode_entries(entries)))
                .collect(),
        })
    }

    /// Executes `request` against `handler` as a single atomic transaction.
    pub fn execute<H: TransactionHandler>(
        &self,
        handler: &H,
        request: &TransactionRequest,
    ) -> Result<H::Response, ApplyError> {
        debug!(
            "Executing {} for {}",
            request.function(),
            request.creator()
        );
        self.with_context(|context| handler.apply(request, context))
    }

    /// Runs `f` inside a transaction. Writes made through the context are committed if `f`
    /// returns `Ok` and discarded otherwise.
    pub fn with_context<T, F>(&self, f: F) -> Result<T, ApplyError>
    where
        F: FnOnce(&dyn TransactionContext) -> Result<T, ApplyError>,
    {
        let mut state = self.lock()?;
        let (result, write_set) = {
            let context = MemoryTransactionContext::new(&*state, Arc::clone(&self.open_iterators));
            let result = f(&context)?;
            (result, context.into_write_set())
        };
        state.commit(write_set);
        Ok(result)
    }

    /// Reads a committed public entry.
    pub fn get_state_entry(&self, key: &str) -> Result<Option<Vec<u8>>, ContextError> {
        Ok(self.lock()?.public.get(key).cloned())
    }

    /// Reads a committed private entry.
    pub fn get_private_data(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, ContextError> {
        Ok(self
            .lock()?
            .private
            .get(collection)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    /// Number of query iterators that have been handed out and not yet dropped.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<LedgerState>, ContextError> {
        self.inner.lock().map_err(|_| {
            ContextError::InternalError(InternalError::with_message(
                "Cannot access ledger: mutex lock poisoned".to_string(),
            ))
        })
    }
}

fn encode_entries(entries: &Entries) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), base64::encode(value)))
        .collect()
}

fn decode_entries(entries: &BTreeMap<String, String>) -> Result<Entries, ContextError> {
    entries
        .iter()
        .map(|(key, value)| {
            base64::decode(value)
                .map(|bytes| (key.clone(), bytes))
                .map_err(|err| {
                    ContextError::InternalError(InternalError::from_source_with_prefix(
                        Box::new(err),
                        format!("Cannot decode snapshot entry {:?}", key),
                    ))
                })
        })
        .collect()
}

/// The view of the ledger handed to a contract for one transaction.
pub struct MemoryTransactionContext<'a> {
    committed: &'a LedgerState,
    writes: RefCell<WriteSet>,
    open_iterators: Arc<AtomicUsize>,
}

impl<'a> MemoryTransactionContext<'a> {
    fn new(committed: &'a LedgerState, open_iterators: Arc<AtomicUsize>) -> Self {
        MemoryTransactionContext {
            committed,
            writes: RefCell::new(WriteSet::default()),
            open_iterators,
        }
    }

    fn into_write_set(self) -> WriteSet {
        self.writes.into_inner()
    }

    fn iterator(&self, results: Vec<KeyValue>) -> StateIterator<'_> {
        Box::new(MemoryStateIterator::new(
            results,
            Arc::clone(&self.open_iterators),
        ))
    }
}

fn validate_key(key: &str) -> Result<(), ContextError> {
    if key.is_empty() {
        return Err(ContextError::InvalidKey("Key cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_collection(collection: &str) -> Result<(), ContextError> {
    if collection.is_empty() {
        return Err(ContextError::InvalidKey(
            "Collection name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn read_through(
    committed: Option<&Entries>,
    pending: Option<&PendingEntries>,
    key: &str,
) -> Option<Vec<u8>> {
    match pending.and_then(|pending| pending.get(key)) {
        Some(value) => value.clone(),
        None => committed.and_then(|entries| entries.get(key)).cloned(),
    }
}

/// Committed entries overlaid with pending writes, restricted to keys accepted by `filter`.
fn merged_entries<F>(
    committed: Option<&Entries>,
    pending: Option<&PendingEntries>,
    filter: F,
) -> Vec<KeyValue>
where
    F: Fn(&str) -> bool,
{
    let mut merged: Entries = committed
        .into_iter()
        .flat_map(|entries| entries.iter())
        .filter(|(key, _)| filter(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in pending
        .into_iter()
        .flat_map(|pending| pending.iter())
        .filter(|(key, _)| filter(key))
    {
        match value {
            Some(value) => {
                merged.insert(key.clone(), value.clone());
            }
            None => {
                merged.remove(key);
            }
        }
    }

    merged.into_iter().collect()
}

fn parse_selector(query: &str) -> Result<Map<String, Value>, ContextError> {
    let query: Value = serde_json::from_str(query)
        .map_err(|err| ContextError::QueryError(format!("Cannot parse query: {}", err)))?;
    match query.get("selector") {
        Some(Value::Object(selector)) => Ok(selector.clone()),
        _ => Err(ContextError::QueryError(
            "Query must contain a selector object".to_string(),
        )),
    }
}

fn matches_selector(selector: &Map<String, Value>, value: &[u8]) -> bool {
    match serde_json::from_slice::<Value>(value) {
        Ok(Value::Object(document)) => selector
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected)),
        _ => false,
    }
}

impl<'a> TransactionContext for MemoryTransactionContext<'a> {
    fn get_state_entry(&self, key: &str) -> Result<Option<Vec<u8>>, ContextError> {
        validate_key(key)?;
        let writes = self.writes.borrow();
        Ok(read_through(
            Some(&self.committed.public),
            Some(&writes.public),
            key,
        ))
    }

    fn set_state_entry(&self, key: String, value: Vec<u8>) -> Result<(), ContextError> {
        validate_key(&key)?;
        self.writes.borrow_mut().public.insert(key, Some(value));
        Ok(())
    }

    fn delete_state_entry(&self, key: &str) -> Result<(), ContextError> {
        validate_key(key)?;
        self.writes.borrow_mut().public.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<StateIterator<'_>, ContextError> {
        let prefix = create_composite_key(object_type, attributes)?;
        let writes = self.writes.borrow();
        let results = merged_entries(
            Some(&self.committed.public),
            Some(&writes.public),
            |key| key.starts_with(&prefix),
        );
        Ok(self.iterator(results))
    }

    fn get_private_data(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, ContextError> {
        validate_collection(collection)?;
        validate_key(key)?;
        let writes = self.writes.borrow();
        Ok(read_through(
            self.committed.private.get(collection),
            writes.private.get(collection),
            key,
        ))
    }

    fn put_private_data(
        &self,
        collection: &str,
        key: String,
        value: Vec<u8>,
    ) -> Result<(), ContextError> {
        validate_collection(collection)?;
        validate_key(&key)?;
        self.writes
            .borrow_mut()
            .private
            .entry(collection.to_string())
            .or_default()
            .insert(key, Some(value));
        Ok(())
    }

    fn delete_private_data(&self, collection: &str, key: &str) -> Result<(), ContextError> {
        validate_collection(collection)?;
        validate_key(key)?;
        self.writes
            .borrow_mut()
            .private
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), None);
        Ok(())
    }

    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<StateIterator<'_>, ContextError> {
        validate_collection(collection)?;
        let selector = parse_selector(query)?;
        let writes = self.writes.borrow();
        let results = merged_entries(
            self.committed.private.get(collection),
            writes.private.get(collection),
            |_| true,
        )
        .into_iter()
        .filter(|(_, value)| matches_selector(&selector, value))
        .collect();
        Ok(self.iterator(results))
    }
}

/// Cursor over a materialized result set. Holds its slot in the ledger's open iterator count
/// until dropped.
struct MemoryStateIterator {
    results: std::vec::IntoIter<KeyValue>,
    open_iterators: Arc<AtomicUsize>,
}

impl MemoryStateIterator {
    fn new(results: Vec<KeyValue>, open_iterators: Arc<AtomicUsize>) -> Self {
        open_iterators.fetch_add(1, Ordering::SeqCst);
        MemoryStateIterator {
            results: results.into_iter(),
            open_iterators,
        }
    }
}

impl Iterator for MemoryStateIterator {
    type Item = Result<KeyValue, ContextError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.next().map(Ok)
    }
}

impl Drop for MemoryStateIterator {
    fn drop(&mut self) {
        self.open_iterators.fetch_sub(1, Ordering::SeqCst);
    }
}
