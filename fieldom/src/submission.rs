//! The submission handler: validate, then persist the accepted values for
//! one entity instance as a single atomic unit.

use std::collections::BTreeMap;

use redis::{aio::ConnectionManager, cmd};
use serde::Serialize;

use crate::{
    catalog::{CatalogSource, require_scope},
    engine::validate_fields,
    errors::EngineError,
    id::generate_value_id,
    keys::KeyContext,
    runtime::{ValueMutation, ValueRowWrite, execute_value_mutation},
    types::{FieldScope, FieldValue},
};

/// Store of submitted values, keyed by `(custom_field_id, entity_instance_id)`.
///
/// `upsert` applies one submission's write set atomically: all rows commit
/// or none do. Last committed submission wins; there are no merge semantics.
#[allow(async_fn_in_trait)]
pub trait ValueStore {
    /// All stored values for one entity instance.
    async fn values(&mut self, entity_instance_id: &str) -> Result<Vec<FieldValue>, EngineError>;

    /// Upserts one row per write: an existing row keeps its id and takes the
    /// new value; otherwise a row is inserted with a generated id. Returns
    /// the stored rows in write order.
    async fn upsert(
        &mut self,
        entity_instance_id: &str,
        writes: Vec<ValueWrite>,
    ) -> Result<Vec<FieldValue>, EngineError>;
}

/// One accepted field value to persist.
#[derive(Debug, Clone)]
pub struct ValueWrite {
    pub custom_field_id: String,
    pub field_value: String,
}

/// Outcome of a submission. Like validation, rejection is data, not an
/// error: the caller renders the `{field_id: reason}` map back to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted { values: Vec<FieldValue> },
    Rejected { errors: BTreeMap<String, String> },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Validates `submitted` against the scope's catalog and, when valid,
/// upserts one value row per configured field that has a submitted entry.
///
/// On rejection nothing is written. Submitted keys with no matching
/// definition are never stored. Values are stored verbatim, with no
/// normalization of numerics or booleans.
pub async fn submit<C, S>(
    catalog: &mut C,
    store: &mut S,
    scope: &FieldScope,
    entity_instance_id: &str,
    submitted: &BTreeMap<String, String>,
) -> Result<SubmissionOutcome, EngineError>
where
    C: CatalogSource,
    S: ValueStore,
{
    require_scope(catalog, scope).await?;
    let fields = catalog.fields(scope).await?;

    let outcome = validate_fields(&fields, submitted);
    if !outcome.is_valid {
        return Ok(SubmissionOutcome::Rejected {
            errors: outcome.errors,
        });
    }

    let writes: Vec<ValueWrite> = fields
        .iter()
        .filter_map(|field| {
            submitted.get(&field.id).map(|value| ValueWrite {
                custom_field_id: field.id.clone(),
                field_value: value.clone(),
            })
        })
        .collect();

    let values = store.upsert(entity_instance_id, writes).await?;
    Ok(SubmissionOutcome::Accepted { values })
}

/// Value store backed by the engine's Redis layout: one hash per instance,
/// written through the atomic upsert script.
pub struct RedisValueStore<'a> {
    prefix: &'a str,
    conn: &'a mut ConnectionManager,
}

impl<'a> RedisValueStore<'a> {
    pub fn new(prefix: &'a str, conn: &'a mut ConnectionManager) -> Self {
        Self { prefix, conn }
    }
}

impl ValueStore for RedisValueStore<'_> {
    async fn values(&mut self, entity_instance_id: &str) -> Result<Vec<FieldValue>, EngineError> {
        let key = KeyContext::new(self.prefix).values(entity_instance_id);
        let raw: std::collections::HashMap<String, String> =
            cmd("HGETALL").arg(&key).query_async(self.conn).await?;
        let mut values = Vec::with_capacity(raw.len());
        for (_, json) in raw {
            let value: FieldValue = serde_json::from_str(&json)
                .map_err(|err| EngineError::other(format!("failed to decode field value: {err}")))?;
            values.push(value);
        }
        Ok(values)
    }

    async fn upsert(
        &mut self,
        entity_instance_id: &str,
        writes: Vec<ValueWrite>,
    ) -> Result<Vec<FieldValue>, EngineError> {
        let mutation = ValueMutation {
            values_key: KeyContext::new(self.prefix).values(entity_instance_id),
            entity_instance_id: entity_instance_id.to_string(),
            rows: writes
                .into_iter()
                .map(|write| ValueRowWrite {
                    custom_field_id: write.custom_field_id,
                    field_value: write.field_value,
                    fresh_id: generate_value_id(),
                })
                .collect(),
        };
        execute_value_mutation(self.conn, &mutation).await
    }
}

/// In-memory value store. A plain map mutation is already atomic with
/// respect to the trait's `&mut self` access.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryValueStore {
    rows: BTreeMap<(String, String), FieldValue>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored rows, across all instances.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ValueStore for MemoryValueStore {
    async fn values(&mut self, entity_instance_id: &str) -> Result<Vec<FieldValue>, EngineError> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.entity_instance_id == entity_instance_id)
            .cloned()
            .collect())
    }

    async fn upsert(
        &mut self,
        entity_instance_id: &str,
        writes: Vec<ValueWrite>,
    ) -> Result<Vec<FieldValue>, EngineError> {
        use std::collections::btree_map::Entry;

        let mut stored = Vec::with_capacity(writes.len());
        for write in writes {
            let key = (entity_instance_id.to_string(), write.custom_field_id.clone());
            let row = match self.rows.entry(key) {
                Entry::Occupied(mut occupied) => {
                    occupied.get_mut().field_value = write.field_value;
                    occupied.get().clone()
                }
                Entry::Vacant(vacant) => vacant
                    .insert(FieldValue {
                        id: generate_value_id(),
                        custom_field_id: write.custom_field_id,
                        entity_instance_id: entity_instance_id.to_string(),
                        field_value: write.field_value,
                    })
                    .clone(),
            };
            stored.push(row);
        }
        Ok(stored)
    }
}
