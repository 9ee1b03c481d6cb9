//! Read-side access to field and tab definitions.
//!
//! The accessor is a trait over an injected data source, never process-wide
//! state, so the engine runs identically against Redis and against the
//! in-memory source used in tests and embedded hosts. Both return
//! definitions ordered by `display_order` with creation order breaking ties,
//! and both return an empty list (not an error) for a registered scope with
//! no fields: that is the normal "no custom form" case.

use std::collections::HashSet;

use redis::{aio::ConnectionManager, cmd};

use crate::{
    errors::EngineError,
    keys::KeyContext,
    types::{EntityType, FieldDefinition, FieldScope, FieldTab},
};

/// Read-only source of field/tab definitions for a scope.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Whether the scope entity (the group, the event, …) exists at all.
    /// `false` is a "not found" condition, distinct from an empty catalog.
    async fn scope_exists(&mut self, scope: &FieldScope) -> Result<bool, EngineError>;

    /// Field definitions for the scope, ordered for presentation.
    async fn fields(&mut self, scope: &FieldScope) -> Result<Vec<FieldDefinition>, EngineError>;

    /// Tabs for the scope, ordered for presentation.
    async fn tabs(&mut self, scope: &FieldScope) -> Result<Vec<FieldTab>, EngineError>;
}

/// Errors with [`EngineError::ScopeNotFound`] unless the scope is registered.
pub async fn require_scope<C: CatalogSource>(
    catalog: &mut C,
    scope: &FieldScope,
) -> Result<(), EngineError> {
    if catalog.scope_exists(scope).await? {
        Ok(())
    } else {
        Err(EngineError::ScopeNotFound {
            entity_type: scope.entity_type,
            entity_id: scope.entity_id.clone(),
        })
    }
}

/// Stable sort: `display_order` first, input (creation) order breaking ties.
pub(crate) fn order_fields(mut fields: Vec<FieldDefinition>) -> Vec<FieldDefinition> {
    fields.sort_by_key(|field| field.display_order);
    fields
}

pub(crate) fn order_tabs(mut tabs: Vec<FieldTab>) -> Vec<FieldTab> {
    tabs.sort_by_key(|tab| tab.display_order);
    tabs
}

/// Catalog source backed by the engine's Redis layout: per-scope index lists
/// plus one JSON record per definition.
pub struct RedisCatalog<'a> {
    prefix: &'a str,
    conn: &'a mut ConnectionManager,
}

impl<'a> RedisCatalog<'a> {
    pub fn new(prefix: &'a str, conn: &'a mut ConnectionManager) -> Self {
        Self { prefix, conn }
    }

    fn ctx(&self) -> KeyContext<'a> {
        KeyContext::new(self.prefix)
    }

    async fn read_index(&mut self, index_key: &str) -> Result<Vec<String>, EngineError> {
        let ids: Vec<String> = cmd("LRANGE")
            .arg(index_key)
            .arg(0)
            .arg(-1)
            .query_async(self.conn)
            .await?;
        Ok(ids)
    }

    async fn read_records(&mut self, keys: &[String]) -> Result<Vec<String>, EngineError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<Option<String>> = cmd("MGET").arg(keys).query_async(self.conn).await?;
        // An id may linger in the index briefly after its record is deleted;
        // such entries are skipped rather than surfaced.
        Ok(raw.into_iter().flatten().collect())
    }
}

impl CatalogSource for RedisCatalog<'_> {
    async fn scope_exists(&mut self, scope: &FieldScope) -> Result<bool, EngineError> {
        let exists: bool = cmd("EXISTS")
            .arg(self.ctx().scope(scope))
            .query_async(self.conn)
            .await?;
        Ok(exists)
    }

    async fn fields(&mut self, scope: &FieldScope) -> Result<Vec<FieldDefinition>, EngineError> {
        let ctx = self.ctx();
        let index_key = ctx.field_index(scope);
        let ids = self.read_index(&index_key).await?;
        let keys: Vec<String> = ids.iter().map(|id| ctx.field(scope, id)).collect();
        let mut fields = Vec::with_capacity(keys.len());
        for json in self.read_records(&keys).await? {
            let field: FieldDefinition = serde_json::from_str(&json)
                .map_err(|err| EngineError::other(format!("failed to decode field definition: {err}")))?;
            fields.push(field);
        }
        Ok(order_fields(fields))
    }

    async fn tabs(&mut self, scope: &FieldScope) -> Result<Vec<FieldTab>, EngineError> {
        let ctx = self.ctx();
        let index_key = ctx.tab_index(scope);
        let ids = self.read_index(&index_key).await?;
        let keys: Vec<String> = ids.iter().map(|id| ctx.tab(scope, id)).collect();
        let mut tabs = Vec::with_capacity(keys.len());
        for json in self.read_records(&keys).await? {
            let tab: FieldTab = serde_json::from_str(&json)
                .map_err(|err| EngineError::other(format!("failed to decode field tab: {err}")))?;
            tabs.push(tab);
        }
        Ok(order_tabs(tabs))
    }
}

/// In-memory catalog source. Definitions are held in creation order; the
/// accessor applies the same ordering rules as the Redis source.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    scopes: HashSet<(EntityType, String)>,
    fields: Vec<FieldDefinition>,
    tabs: Vec<FieldTab>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_scope(&mut self, scope: &FieldScope) {
        self.scopes.insert((scope.entity_type, scope.entity_id.clone()));
    }

    /// Adds a definition, registering its scope as a side effect.
    pub fn add_field(&mut self, field: FieldDefinition) {
        self.register_scope(&field.scope());
        self.fields.push(field);
    }

    pub fn add_tab(&mut self, tab: FieldTab) {
        self.scopes.insert((tab.entity_type, tab.entity_id.clone()));
        self.tabs.push(tab);
    }
}

impl CatalogSource for MemoryCatalog {
    async fn scope_exists(&mut self, scope: &FieldScope) -> Result<bool, EngineError> {
        Ok(self
            .scopes
            .contains(&(scope.entity_type, scope.entity_id.clone())))
    }

    async fn fields(&mut self, scope: &FieldScope) -> Result<Vec<FieldDefinition>, EngineError> {
        let matching = self
            .fields
            .iter()
            .filter(|field| field.entity_type == scope.entity_type && field.entity_id == scope.entity_id)
            .cloned()
            .collect();
        Ok(order_fields(matching))
    }

    async fn tabs(&mut self, scope: &FieldScope) -> Result<Vec<FieldTab>, EngineError> {
        let matching = self
            .tabs
            .iter()
            .filter(|tab| tab.entity_type == scope.entity_type && tab.entity_id == scope.entity_id)
            .cloned()
            .collect();
        Ok(order_tabs(matching))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    fn scope() -> FieldScope {
        FieldScope::new(EntityType::GroupMembership, "g1")
    }

    #[tokio::test]
    async fn empty_catalog_is_not_an_error() {
        let mut catalog = MemoryCatalog::new();
        catalog.register_scope(&scope());
        assert!(catalog.fields(&scope()).await.unwrap().is_empty());
        assert!(catalog.tabs(&scope()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistered_scope_is_not_found() {
        let mut catalog = MemoryCatalog::new();
        let err = require_scope(&mut catalog, &scope()).await.unwrap_err();
        assert!(matches!(err, EngineError::ScopeNotFound { .. }));
    }

    #[tokio::test]
    async fn display_order_wins_and_creation_order_breaks_ties() {
        let mut catalog = MemoryCatalog::new();
        let s = scope();
        catalog.add_field(FieldDefinition::new("c", &s, "C", FieldType::Text).with_display_order(2));
        catalog.add_field(FieldDefinition::new("a", &s, "A", FieldType::Text).with_display_order(1));
        catalog.add_field(FieldDefinition::new("b", &s, "B", FieldType::Text).with_display_order(1));

        let ids: Vec<String> = catalog
            .fields(&s)
            .await
            .unwrap()
            .into_iter()
            .map(|field| field.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scopes_do_not_leak_into_each_other() {
        let mut catalog = MemoryCatalog::new();
        let group = scope();
        let event = FieldScope::new(EntityType::EventRegistration, "e1");
        catalog.add_field(FieldDefinition::new("f1", &group, "Name", FieldType::Text));
        catalog.add_field(FieldDefinition::new("f2", &event, "Ticket", FieldType::Text));

        let fields = catalog.fields(&event).await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id, "f2");
    }
}
