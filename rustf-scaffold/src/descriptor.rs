//! Field descriptors: how one column is listed, edited, searched and sorted
//!
//! [`FieldDescriptorBuilder`] derives a descriptor from [`ColumnMetadata`]. The
//! results are defaults for the client to edit, not facts about the column.

use crate::schema::ColumnMetadata;
use crate::ScaffoldError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client-side hook formatting date/time cells
pub const DATE_TIME_CALLBACK: &str = "meTables.dateTimeString";

/// Minimum length used for `varchar(N)` range validation
pub const MIN_TEXT_LENGTH: u32 = 2;

const INTEGER_PREFIXES: [&str; 5] = ["tinyint", "smallint", "mediumint", "bigint", "int"];

static VARCHAR_LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^varchar\((\d+)\)").expect("FieldDescriptorBuilder: Invalid varchar regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Hidden,
    Select,
    Radio,
    Password,
    Textarea,
}

impl InputType {
    pub const ALL: [InputType; 6] = [
        InputType::Text,
        InputType::Hidden,
        InputType::Select,
        InputType::Radio,
        InputType::Password,
        InputType::Textarea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Hidden => "hidden",
            InputType::Select => "select",
            InputType::Radio => "radio",
            InputType::Password => "password",
            InputType::Textarea => "textarea",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InputType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ScaffoldError::validation(format!("unknown input type '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationOptions {
    pub required: bool,
    pub numeric: bool,
    /// Inclusive `[min, max]` length bounds
    pub length_range: Option<(u32, u32)>,
}

impl ValidationOptions {
    pub fn is_empty(&self) -> bool {
        !self.required && !self.numeric && self.length_range.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub title: String,
    pub edit_enabled: bool,
    pub input_type: InputType,
    pub validation: ValidationOptions,
    pub search_enabled: bool,
    pub sortable: bool,
    pub created_cell_callback: Option<String>,
}

impl FieldDescriptor {
    /// Descriptor with the default presentation settings
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            edit_enabled: true,
            input_type: InputType::Text,
            validation: ValidationOptions::default(),
            search_enabled: false,
            sortable: true,
            created_cell_callback: None,
        }
    }
}

/// Replaceable heuristics for the presentation side of a descriptor
pub trait DescriptorPolicy: Send + Sync {
    fn title(&self, column: &ColumnMetadata) -> String;

    fn cell_callback(&self, column: &ColumnMetadata) -> Option<String>;
}

/// Comment-or-name titles, date formatting for `*_at` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl DescriptorPolicy for DefaultPolicy {
    fn title(&self, column: &ColumnMetadata) -> String {
        if column.comment.trim().is_empty() {
            column.name.clone()
        } else {
            column.comment.clone()
        }
    }

    fn cell_callback(&self, column: &ColumnMetadata) -> Option<String> {
        column
            .name
            .contains("_at")
            .then(|| DATE_TIME_CALLBACK.to_string())
    }
}

pub struct FieldDescriptorBuilder {
    policy: Box<dyn DescriptorPolicy>,
}

impl FieldDescriptorBuilder {
    pub fn new() -> Self {
        Self::with_policy(DefaultPolicy)
    }

    pub fn with_policy<P: DescriptorPolicy + 'static>(policy: P) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    pub fn build(&self, column: &ColumnMetadata) -> FieldDescriptor {
        let mut descriptor = FieldDescriptor::new(column.name.clone(), self.policy.title(column));

        descriptor.validation = ValidationOptions {
            required: !column.nullable,
            numeric: is_integer_type(&column.sql_type),
            length_range: varchar_length(&column.sql_type).map(|max| (MIN_TEXT_LENGTH, max)),
        };
        descriptor.created_cell_callback = self
            .policy
            .cell_callback(column)
            .filter(|callback| !callback.trim().is_empty());

        descriptor
    }

    pub fn build_all(&self, columns: &[ColumnMetadata]) -> Vec<FieldDescriptor> {
        columns.iter().map(|column| self.build(column)).collect()
    }
}

impl Default for FieldDescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_integer_type(sql_type: &str) -> bool {
    let lower = sql_type.trim().to_lowercase();
    INTEGER_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

fn varchar_length(sql_type: &str) -> Option<u32> {
    VARCHAR_LENGTH
        .captures(sql_type.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
