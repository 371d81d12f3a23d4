//! Service wiring and the in-memory record store behind the section routes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use fleetdesk_auth::Module;
use fleetdesk_core::{DomainError, DomainResult, RecordId, UserId};

/// A stored back-office record (vehicle, driver, trip, expense, ...).
///
/// Fields are free-form; form validation happens in the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub module: Module,
    pub data: Map<String, Value>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Module-partitioned record store.
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: RwLock<HashMap<Module, BTreeMap<RecordId, Record>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, module: Module) -> Vec<Record> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&module)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, module: Module) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&module).map_or(0, BTreeMap::len)
    }

    pub fn get(&self, module: Module, id: RecordId) -> DomainResult<Record> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&module)
            .and_then(|records| records.get(&id))
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    pub fn create(
        &self,
        module: Module,
        body: Value,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Record> {
        let data = record_fields(body)?;
        let record = Record {
            id: RecordId::new(),
            module,
            data,
            created_by: actor,
            created_at: now,
            updated_at: now,
        };

        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(module).or_default().insert(record.id, record.clone());
        Ok(record)
    }

    /// Replace a record's fields.
    pub fn update(
        &self,
        module: Module,
        id: RecordId,
        body: Value,
        now: DateTime<Utc>,
    ) -> DomainResult<Record> {
        let data = record_fields(body)?;

        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let record = map
            .get_mut(&module)
            .and_then(|records| records.get_mut(&id))
            .ok_or(DomainError::NotFound)?;
        record.data = data;
        record.updated_at = now;
        Ok(record.clone())
    }

    pub fn delete(&self, module: Module, id: RecordId) -> DomainResult<Record> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.get_mut(&module)
            .and_then(|records| records.remove(&id))
            .ok_or(DomainError::NotFound)
    }
}

fn record_fields(body: Value) -> DomainResult<Map<String, Value>> {
    match body {
        Value::Object(fields) if fields.is_empty() => {
            Err(DomainError::validation("record must have at least one field"))
        }
        Value::Object(fields) => Ok(fields),
        _ => Err(DomainError::validation("record body must be a JSON object")),
    }
}

/// Shared services handed to handlers via `Extension`.
#[derive(Debug, Default)]
pub struct AppServices {
    pub records: RecordStore,
}

impl AppServices {
    pub fn new() -> Self {
        Self::default()
    }
}
