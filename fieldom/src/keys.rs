use crate::types::FieldScope;

/// Common key-construction helpers for the engine's Redis layout.
///
/// Definitions and tabs live one JSON string per key, with a per-scope list
/// acting as the creation-order index. Stored values live in one hash per
/// entity instance, keyed by field id (the natural upsert key).
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Marker proving the scope entity exists upstream. Written when the
    /// scope is registered; its absence means "not found", not "empty form".
    pub fn scope(&self, scope: &FieldScope) -> String {
        format!("{}:scope:{}:{}", self.prefix, scope.entity_type, scope.entity_id)
    }

    pub fn field(&self, scope: &FieldScope, field_id: &str) -> String {
        format!(
            "{}:field:{}:{}:{}",
            self.prefix, scope.entity_type, scope.entity_id, field_id
        )
    }

    /// Append-only list of field ids in creation order.
    pub fn field_index(&self, scope: &FieldScope) -> String {
        format!("{}:field_index:{}:{}", self.prefix, scope.entity_type, scope.entity_id)
    }

    pub fn tab(&self, scope: &FieldScope, tab_id: &str) -> String {
        format!(
            "{}:tab:{}:{}:{}",
            self.prefix, scope.entity_type, scope.entity_id, tab_id
        )
    }

    /// Append-only list of tab ids in creation order.
    pub fn tab_index(&self, scope: &FieldScope) -> String {
        format!("{}:tab_index:{}:{}", self.prefix, scope.entity_type, scope.entity_id)
    }

    /// Hash of `field_id -> FieldValue` JSON for one entity instance.
    pub fn values(&self, entity_instance_id: &str) -> String {
        format!("{}:values:{}", self.prefix, entity_instance_id)
    }
}
