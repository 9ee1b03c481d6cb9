//! Client facade over the Redis-backed engine.
//!
//! One entry point owns the connection and key prefix and exposes the four
//! wire operations. `entity_type` arrives as a string here: the closed-set
//! parse happens at this boundary, so an unrecognized value is rejected as a
//! client error before any storage access.
//!
//! Instance existence is owned by the host domain (the membership
//! application or registration row): verify the instance before calling
//! `submit` / `submitted_values`, and surface
//! [`EngineError::InstanceNotFound`] from that lookup.
//!
//! # Example
//! ```ignore
//! let client = FormsClient::connect("redis://localhost:6379", "forms").await?;
//!
//! let structure = client.form_structure("GroupMembership", &group_id).await?;
//! let outcome = client.submit("GroupMembership", &group_id, &application_id, &body).await?;
//! ```

use std::collections::BTreeMap;

use redis::aio::ConnectionManager;

use crate::{
    admin::CatalogAdmin,
    catalog::RedisCatalog,
    compose::{self, FormStructure, SubmittedForm},
    engine::{self, ValidationOutcome},
    errors::EngineError,
    submission::{self, RedisValueStore, SubmissionOutcome},
    types::FieldScope,
};

#[derive(Clone)]
pub struct FormsClient {
    conn: ConnectionManager,
    prefix: String,
}

impl FormsClient {
    /// Create a client over an existing connection and key prefix.
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Create a client from a Redis connection URL.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, redis::RedisError> {
        let redis_client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(redis_client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get a clone of the connection manager for advanced operations.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// `GET form-structure?entityType=&entityId=`
    pub async fn form_structure(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<FormStructure, EngineError> {
        let scope = parse_scope(entity_type, entity_id)?;
        let mut conn = self.conn.clone();
        let mut catalog = RedisCatalog::new(&self.prefix, &mut conn);
        compose::form_structure(&mut catalog, &scope).await
    }

    /// `POST validate?entityType=&entityId=` with body `{fieldId: value}`.
    ///
    /// Read-only; safe to call any number of times before submitting.
    pub async fn validate(
        &self,
        entity_type: &str,
        entity_id: &str,
        submitted: &BTreeMap<String, String>,
    ) -> Result<ValidationOutcome, EngineError> {
        let scope = parse_scope(entity_type, entity_id)?;
        let mut conn = self.conn.clone();
        let mut catalog = RedisCatalog::new(&self.prefix, &mut conn);
        crate::catalog::require_scope(&mut catalog, &scope).await?;
        engine::validate(&mut catalog, &scope, submitted).await
    }

    /// `POST submit?entityType=&entityId=` with body `{fieldId: value}`.
    pub async fn submit(
        &self,
        entity_type: &str,
        entity_id: &str,
        entity_instance_id: &str,
        submitted: &BTreeMap<String, String>,
    ) -> Result<SubmissionOutcome, EngineError> {
        let scope = parse_scope(entity_type, entity_id)?;
        let mut catalog_conn = self.conn.clone();
        let mut store_conn = self.conn.clone();
        let mut catalog = RedisCatalog::new(&self.prefix, &mut catalog_conn);
        let mut store = RedisValueStore::new(&self.prefix, &mut store_conn);
        submission::submit(&mut catalog, &mut store, &scope, entity_instance_id, submitted).await
    }

    /// `GET submitted-values?entityType=&entityId=&entityInstanceId=`
    pub async fn submitted_values(
        &self,
        entity_type: &str,
        entity_id: &str,
        entity_instance_id: &str,
    ) -> Result<SubmittedForm, EngineError> {
        let scope = parse_scope(entity_type, entity_id)?;
        let mut catalog_conn = self.conn.clone();
        let mut store_conn = self.conn.clone();
        let mut catalog = RedisCatalog::new(&self.prefix, &mut catalog_conn);
        let mut store = RedisValueStore::new(&self.prefix, &mut store_conn);
        compose::submitted_values(&mut catalog, &mut store, &scope, entity_instance_id).await
    }

    /// Administrator handle for the catalog write side. Not part of the
    /// engine's own surface; the engine only ever reads definitions.
    pub fn admin_with<'a>(&'a self, conn: &'a mut ConnectionManager) -> CatalogAdmin<'a> {
        CatalogAdmin::new(&self.prefix, conn)
    }
}

fn parse_scope(entity_type: &str, entity_id: &str) -> Result<FieldScope, EngineError> {
    if entity_id.trim().is_empty() {
        return Err(EngineError::InvalidRequest {
            message: "entityId is required".to_string(),
        });
    }
    Ok(FieldScope::new(entity_type.parse()?, entity_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parsing_rejects_unknown_type_and_blank_id() {
        assert!(matches!(
            parse_scope("Membership", "g1").unwrap_err(),
            EngineError::UnknownEntityType { .. }
        ));
        assert!(matches!(
            parse_scope("GroupMembership", "  ").unwrap_err(),
            EngineError::InvalidRequest { .. }
        ));
        assert!(parse_scope("EventRegistration", "e1").is_ok());
    }
}
