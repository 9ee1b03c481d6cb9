use redis::Script;
use std::sync::LazyLock;

pub const VALUE_UPSERT_SCRIPT_BODY: &str = include_str!("../../lua/value_upsert.lua");

pub static VALUE_UPSERT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(VALUE_UPSERT_SCRIPT_BODY));
