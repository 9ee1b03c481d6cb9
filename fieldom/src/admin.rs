//! Write side of the catalog, used by administrator tooling out-of-band of
//! the engine: scope registration and field/tab definition CRUD.
//!
//! Creation order is preserved by appending ids to a per-scope index list;
//! updates rewrite the record in place and leave the index untouched, so
//! `display_order` ties keep breaking on the original creation order.

use redis::{aio::ConnectionManager, cmd};

use crate::{
    errors::EngineError,
    keys::KeyContext,
    types::{FieldDefinition, FieldScope, FieldTab},
};

/// Administrator handle over one prefix's catalog.
pub struct CatalogAdmin<'a> {
    prefix: &'a str,
    conn: &'a mut ConnectionManager,
}

impl<'a> CatalogAdmin<'a> {
    pub fn new(prefix: &'a str, conn: &'a mut ConnectionManager) -> Self {
        Self { prefix, conn }
    }

    fn ctx(&self) -> KeyContext<'a> {
        KeyContext::new(self.prefix)
    }

    /// Marks the scope entity as existing. Until a scope is registered every
    /// engine operation on it reports "not found".
    pub async fn register_scope(&mut self, scope: &FieldScope) -> Result<(), EngineError> {
        let _: () = cmd("SET")
            .arg(self.ctx().scope(scope))
            .arg("1")
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    pub async fn create_field(&mut self, field: FieldDefinition) -> Result<(), EngineError> {
        let scope = field.scope();
        self.check_field(&field).await?;

        let ctx = self.ctx();
        let record_key = ctx.field(&scope, &field.id);
        let created: bool = cmd("SETNX")
            .arg(&record_key)
            .arg(encode(&field)?)
            .query_async(self.conn)
            .await?;
        if !created {
            return Err(EngineError::InvalidRequest {
                message: format!("field '{}' already exists", field.id),
            });
        }
        let _: () = cmd("RPUSH")
            .arg(ctx.field_index(&scope))
            .arg(&field.id)
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    /// Rewrites an existing definition. The index entry is untouched, so the
    /// field keeps its creation-order position.
    pub async fn update_field(&mut self, field: FieldDefinition) -> Result<(), EngineError> {
        let scope = field.scope();
        self.check_field(&field).await?;

        let record_key = self.ctx().field(&scope, &field.id);
        let exists: bool = cmd("EXISTS").arg(&record_key).query_async(self.conn).await?;
        if !exists {
            return Err(EngineError::InvalidRequest {
                message: format!("field '{}' does not exist", field.id),
            });
        }
        let _: () = cmd("SET")
            .arg(&record_key)
            .arg(encode(&field)?)
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    /// Removes a definition. Stored values for it are left in place; they
    /// are simply never composed again.
    pub async fn delete_field(&mut self, scope: &FieldScope, field_id: &str) -> Result<(), EngineError> {
        let ctx = self.ctx();
        let _: () = cmd("DEL")
            .arg(ctx.field(scope, field_id))
            .query_async(self.conn)
            .await?;
        let _: () = cmd("LREM")
            .arg(ctx.field_index(scope))
            .arg(0)
            .arg(field_id)
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    pub async fn create_tab(&mut self, tab: FieldTab) -> Result<(), EngineError> {
        let scope = FieldScope::new(tab.entity_type, tab.entity_id.clone());
        let ctx = self.ctx();
        let record_key = ctx.tab(&scope, &tab.id);
        let created: bool = cmd("SETNX")
            .arg(&record_key)
            .arg(encode(&tab)?)
            .query_async(self.conn)
            .await?;
        if !created {
            return Err(EngineError::InvalidRequest {
                message: format!("tab '{}' already exists", tab.id),
            });
        }
        let _: () = cmd("RPUSH")
            .arg(ctx.tab_index(&scope))
            .arg(&tab.id)
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    /// Removes a tab. Fields referencing it degrade to the flat list on the
    /// read side; reassigning them is the administrator's call.
    pub async fn delete_tab(&mut self, scope: &FieldScope, tab_id: &str) -> Result<(), EngineError> {
        let ctx = self.ctx();
        let _: () = cmd("DEL").arg(ctx.tab(scope, tab_id)).query_async(self.conn).await?;
        let _: () = cmd("LREM")
            .arg(ctx.tab_index(scope))
            .arg(0)
            .arg(tab_id)
            .query_async(self.conn)
            .await?;
        Ok(())
    }

    /// Definition invariants: choice types carry options; a tab reference
    /// points at a tab of the same scope.
    async fn check_field(&mut self, field: &FieldDefinition) -> Result<(), EngineError> {
        if field.field_type.is_choice() && field.options().is_empty() {
            return Err(EngineError::InvalidRequest {
                message: format!(
                    "field '{}' is a choice type and needs non-empty options",
                    field.id
                ),
            });
        }
        if let Some(tab_id) = field.tab_id.as_deref() {
            let tab_key = self.ctx().tab(&field.scope(), tab_id);
            let exists: bool = cmd("EXISTS").arg(&tab_key).query_async(self.conn).await?;
            if !exists {
                return Err(EngineError::InvalidRequest {
                    message: format!("field '{}' references unknown tab '{tab_id}'", field.id),
                });
            }
        }
        Ok(())
    }
}

fn encode<T: serde::Serialize>(record: &T) -> Result<String, EngineError> {
    serde_json::to_string(record)
        .map_err(|err| EngineError::other(format!("failed to encode catalog record: {err}")))
}
