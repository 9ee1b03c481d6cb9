use redis::aio::ConnectionLike;
use serde_json::Value;

use crate::{
    errors::EngineError,
    runtime::{commands::ValueMutation, scripts::VALUE_UPSERT_SCRIPT},
    types::FieldValue,
};

/// Runs one value mutation through the upsert script and decodes the stored
/// rows from its reply. The script executes atomically on the server; the
/// caller sees either every row committed or an error with nothing written.
pub async fn execute_value_mutation<C>(
    conn: &mut C,
    mutation: &ValueMutation,
) -> Result<Vec<FieldValue>, EngineError>
where
    C: ConnectionLike + Send,
{
    if mutation.rows.is_empty() {
        return Ok(Vec::new());
    }

    let payload = serde_json::to_string(mutation)
        .map_err(|err| EngineError::other(format!("failed to serialize value mutation: {err}")))?;

    let mut invocation = VALUE_UPSERT_SCRIPT.prepare_invoke();
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await?;

    let reply: Value = serde_json::from_str(&raw)
        .map_err(|err| EngineError::other(format!("failed to parse script reply: {err}")))?;

    if let Some(error) = reply.get("error") {
        let code = error.as_str().unwrap_or("script_error");
        return Err(EngineError::other(code.to_string()));
    }

    let rows = reply
        .get("rows")
        .cloned()
        .ok_or_else(|| EngineError::other("script reply missing rows"))?;
    serde_json::from_value(rows)
        .map_err(|err| EngineError::other(format!("failed to decode stored rows: {err}")))
}
