use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Separator used when a multiple-choice selection crosses the wire or is
/// stored as a single string. Callers use the same convention on submit and
/// display.
pub const SELECTION_SEPARATOR: &str = ", ";

/// The kind of record a custom-field scope applies to.
///
/// This is a closed set: an unrecognized string at the boundary is a client
/// error, not a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    GroupMembership,
    EventRegistration,
}

impl EntityType {
    pub const ALL: [Self; 2] = [Self::GroupMembership, Self::EventRegistration];

    /// Wire name, also used as a key segment in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GroupMembership => "GroupMembership",
            Self::EventRegistration => "EventRegistration",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == value)
            .ok_or_else(|| EngineError::UnknownEntityType {
                value: value.to_string(),
            })
    }
}

/// The scope a set of field definitions belongs to: one instance of an
/// entity type, e.g. one group's membership application form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldScope {
    pub entity_type: EntityType,
    pub entity_id: String,
}

impl FieldScope {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
        }
    }
}

/// The shape of value a field accepts, which determines the validator that runs.
///
/// Closed set: the validator dispatch is an exhaustive `match`, so a new
/// variant cannot be added without its check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    LongText,
    Email,
    Url,
    Integer,
    Decimal,
    YearOfBirth,
    Boolean,
    Date,
    DateTime,
    PhoneNumber,
    Dropdown,
    MultipleChoice,
}

impl FieldType {
    /// Whether this type draws its accepted values from `field_options`.
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::Dropdown | Self::MultipleChoice)
    }
}

/// One administrator-configured input: label, type, required-ness, options,
/// and presentation placement (tab + order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub field_name: String,
    pub field_type: FieldType,
    /// Comma-delimited allowed values. Meaningful only for choice types;
    /// ignored otherwise.
    #[serde(default)]
    pub field_options: String,
    #[serde(default)]
    pub is_required: bool,
    /// `None` means the field renders outside any tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

impl FieldDefinition {
    pub fn new(
        id: impl Into<String>,
        scope: &FieldScope,
        field_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: scope.entity_type,
            entity_id: scope.entity_id.clone(),
            field_name: field_name.into(),
            field_type,
            field_options: String::new(),
            is_required: false,
            tab_id: None,
            display_order: 0,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.field_options = options.into();
        self
    }

    pub fn in_tab(mut self, tab_id: impl Into<String>) -> Self {
        self.tab_id = Some(tab_id.into());
        self
    }

    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    pub fn scope(&self) -> FieldScope {
        FieldScope::new(self.entity_type, self.entity_id.clone())
    }

    /// Parsed `field_options`: split on `,`, trimmed, empty segments dropped.
    pub fn options(&self) -> Vec<&str> {
        split_selections(&self.field_options)
    }
}

/// A named grouping of fields for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTab {
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub tab_name: String,
    #[serde(default)]
    pub display_order: i32,
}

impl FieldTab {
    pub fn new(
        id: impl Into<String>,
        scope: &FieldScope,
        tab_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: scope.entity_type,
            entity_id: scope.entity_id.clone(),
            tab_name: tab_name.into(),
            display_order: 0,
        }
    }

    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }
}

/// One end-user answer to one field definition, tied to one entity instance
/// (e.g. one membership application row).
///
/// The value is stored exactly as submitted; typed parsing happens only
/// transiently during validation. At most one row exists per
/// `(custom_field_id, entity_instance_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub id: String,
    pub custom_field_id: String,
    pub entity_instance_id: String,
    pub field_value: String,
}

/// Splits a delimited selection string the way options and multiple-choice
/// submissions are parsed everywhere: on `,`, trimmed, empties dropped.
pub fn split_selections(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Joins selections with the wire separator.
pub fn join_selections<I, S>(selections: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selections
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(SELECTION_SEPARATOR)
}
