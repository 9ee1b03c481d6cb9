//! Read-side views: the blank form structure, and the same structure
//! annotated with any values one entity instance has submitted.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    catalog::{CatalogSource, require_scope},
    errors::EngineError,
    submission::ValueStore,
    types::{FieldDefinition, FieldScope, FieldTab},
};

/// A blank form: ordered tabs each holding their ordered fields, plus the
/// flat list of fields that render outside any tab.
#[derive(Debug, Clone, Serialize)]
pub struct FormStructure {
    pub tabs: Vec<TabFields>,
    pub untabbed: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabFields {
    pub tab: FieldTab,
    pub fields: Vec<FieldDefinition>,
}

/// The form structure annotated with one instance's stored values.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedForm {
    pub tabs: Vec<TabValues>,
    pub untabbed: Vec<FieldWithValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabValues {
    pub tab: FieldTab,
    pub fields: Vec<FieldWithValue>,
}

/// One field with its stored answer, if any. `has_value` stays `false` for a
/// configured-but-unanswered field, so "never answered" and "answered with
/// an empty string" remain distinguishable.
#[derive(Debug, Clone, Serialize)]
pub struct FieldWithValue {
    pub field: FieldDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub has_value: bool,
}

impl FieldWithValue {
    fn new(field: FieldDefinition, value: Option<String>) -> Self {
        Self {
            has_value: value.is_some(),
            value,
            field,
        }
    }
}

/// Builds the blank form for a scope. A registered scope with no fields
/// yields the empty structure.
pub async fn form_structure<C: CatalogSource>(
    catalog: &mut C,
    scope: &FieldScope,
) -> Result<FormStructure, EngineError> {
    require_scope(catalog, scope).await?;
    let fields = catalog.fields(scope).await?;
    let tabs = catalog.tabs(scope).await?;
    Ok(group_by_tab(fields, tabs))
}

fn group_by_tab(fields: Vec<FieldDefinition>, tabs: Vec<FieldTab>) -> FormStructure {
    let mut sections: Vec<TabFields> = tabs
        .into_iter()
        .map(|tab| TabFields {
            tab,
            fields: Vec::new(),
        })
        .collect();
    let mut untabbed = Vec::new();

    for field in fields {
        let section = field
            .tab_id
            .as_deref()
            .and_then(|tab_id| sections.iter_mut().find(|section| section.tab.id == tab_id));
        match section {
            Some(section) => section.fields.push(field),
            // A dangling tab reference degrades to the flat list rather than
            // dropping the field.
            None => untabbed.push(field),
        }
    }

    FormStructure {
        tabs: sections,
        untabbed,
    }
}

/// Builds the submitted-values view for one entity instance: the form
/// structure with every field annotated from the value store.
pub async fn submitted_values<C, S>(
    catalog: &mut C,
    store: &mut S,
    scope: &FieldScope,
    entity_instance_id: &str,
) -> Result<SubmittedForm, EngineError>
where
    C: CatalogSource,
    S: ValueStore,
{
    let structure = form_structure(catalog, scope).await?;
    let mut stored: HashMap<String, String> = store
        .values(entity_instance_id)
        .await?
        .into_iter()
        .map(|value| (value.custom_field_id, value.field_value))
        .collect();

    let tabs = structure
        .tabs
        .into_iter()
        .map(|section| TabValues {
            fields: annotate(section.fields, &mut stored),
            tab: section.tab,
        })
        .collect();
    let untabbed = annotate(structure.untabbed, &mut stored);

    Ok(SubmittedForm { tabs, untabbed })
}

fn annotate(
    fields: Vec<FieldDefinition>,
    stored: &mut HashMap<String, String>,
) -> Vec<FieldWithValue> {
    fields
        .into_iter()
        .map(|field| {
            let value = stored.remove(&field.id);
            FieldWithValue::new(field, value)
        })
        .collect()
}
