use serde::Serialize;

/// One submission's full write set, applied atomically by the value-upsert
/// script. Rows are keyed inside the values hash by `custom_field_id`, which
/// together with the instance makes the natural upsert key.
#[derive(Debug, Serialize)]
pub struct ValueMutation {
    /// Hash key holding this instance's stored values.
    pub values_key: String,
    pub entity_instance_id: String,
    pub rows: Vec<ValueRowWrite>,
}

/// One field's accepted value within a mutation.
#[derive(Debug, Serialize)]
pub struct ValueRowWrite {
    pub custom_field_id: String,
    pub field_value: String,
    /// Row id to assign if no row exists yet for this field. An existing row
    /// keeps its id; the script decides, so id stability survives races.
    pub fresh_id: String,
}
