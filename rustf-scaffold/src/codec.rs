//! Wire format for the descriptor round trip with the editing client
//!
//! Attribute names follow the `meTables` column options the client edits
//! (`type`, `bSortable`, `createdCell`, ...). Every optional attribute may be
//! omitted; decoding fills in the same defaults the builder uses.

use crate::descriptor::{FieldDescriptor, InputType, ValidationOptions};
use crate::form::FormConfig;
use crate::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    pub table: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireField {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<WireOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<bool>,

    #[serde(rename = "bSortable", default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,

    /// Blank means no callback
    #[serde(rename = "createdCell", default, skip_serializing_if = "Option::is_none")]
    pub created_cell: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rangelength: Option<[u32; 2]>,
}

pub struct FormConfigCodec;

impl FormConfigCodec {
    pub fn decode(payload: &WirePayload) -> Result<FormConfig> {
        Self::decode_fields(&payload.table, &payload.title, &payload.fields)
    }

    pub fn decode_fields(table: &str, title: &str, fields: &[WireField]) -> Result<FormConfig> {
        let mut form = FormConfig::new(table, title);
        for field in fields {
            form.insert(Self::decode_field(field)?)?;
        }
        Ok(form)
    }

    /// Values are kept verbatim; blank keys and titles are rejected.
    pub fn decode_field(field: &WireField) -> Result<FieldDescriptor> {
        let key = field.key.as_str();
        if is_blank(key) {
            return Err(ScaffoldError::validation("field key must not be empty"));
        }

        let title = match field.title.as_deref() {
            Some(title) if !is_blank(title) => title.to_string(),
            _ => return Err(ScaffoldError::invalid_field(key, "missing title")),
        };

        let input_type = match field.input_type.as_deref() {
            None => InputType::default(),
            Some(raw) => raw.parse::<InputType>().map_err(|_| {
                ScaffoldError::invalid_field(key, format!("unknown input type '{}'", raw))
            })?,
        };

        let validation = match &field.options {
            None => ValidationOptions::default(),
            Some(options) => {
                let length_range = match options.rangelength {
                    Some([min, max]) if min > max => {
                        return Err(ScaffoldError::invalid_field(
                            key,
                            format!("invalid length range [{}, {}]", min, max),
                        ))
                    }
                    Some([min, max]) => Some((min, max)),
                    None => None,
                };
                ValidationOptions {
                    required: options.required.unwrap_or(false),
                    numeric: options.number.unwrap_or(false),
                    length_range,
                }
            }
        };

        let created_cell_callback = field
            .created_cell
            .as_deref()
            .filter(|callback| !is_blank(callback))
            .map(str::to_string);

        Ok(FieldDescriptor {
            key: key.to_string(),
            title,
            edit_enabled: field.edit.unwrap_or(true),
            input_type,
            validation,
            search_enabled: field.search.unwrap_or(false),
            sortable: field.sortable.unwrap_or(true),
            created_cell_callback,
        })
    }

    pub fn encode(form: &FormConfig) -> WirePayload {
        WirePayload {
            table: form.table.clone(),
            title: form.title.clone(),
            fields: form.fields().map(Self::encode_field).collect(),
        }
    }

    pub fn encode_field(field: &FieldDescriptor) -> WireField {
        WireField {
            key: field.key.clone(),
            title: Some(field.title.clone()),
            edit: Some(field.edit_enabled),
            input_type: Some(field.input_type.as_str().to_string()),
            options: Some(WireOptions {
                required: Some(field.validation.required),
                number: Some(field.validation.numeric),
                rangelength: field.validation.length_range.map(|(min, max)| [min, max]),
            }),
            search: Some(field.search_enabled),
            sortable: Some(field.sortable),
            created_cell: Some(field.created_cell_callback.clone().unwrap_or_default()),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorPolicy, FieldDescriptorBuilder};
    use crate::schema::ColumnMetadata;
    use serde_json::json;

    fn full_form() -> FormConfig {
        let mut status = FieldDescriptor::new("status", "Status");
        status.input_type = InputType::Select;
        status.search_enabled = true;
        status.sortable = false;

        let mut name = FieldDescriptor::new("name", "Name");
        name.validation = ValidationOptions {
            required: true,
            numeric: false,
            length_range: Some((2, 64)),
        };

        let mut created_at = FieldDescriptor::new("created_at", "Created");
        created_at.edit_enabled = false;
        created_at.created_cell_callback = Some("meTables.dateTimeString".to_string());

        FormConfig::from_fields("yii_user", "Users", [status, name, created_at]).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let form = full_form();
        let decoded = FormConfigCodec::decode(&FormConfigCodec::encode(&form)).unwrap();
        assert_eq!(decoded, form);
    }

    #[test]
    fn test_round_trip_through_json() {
        let form = full_form();
        let json = serde_json::to_string(&FormConfigCodec::encode(&form)).unwrap();
        let payload: WirePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(FormConfigCodec::decode(&payload).unwrap(), form);
    }

    #[test]
    fn test_round_trip_of_built_descriptors() {
        struct Padded;

        impl DescriptorPolicy for Padded {
            fn title(&self, column: &ColumnMetadata) -> String {
                format!(" {} ", column.comment)
            }

            fn cell_callback(&self, column: &ColumnMetadata) -> Option<String> {
                (column.name == "id").then(|| "  ".to_string())
            }
        }

        let columns = [
            ColumnMetadata::new("id", "int", false).with_comment("ID"),
            ColumnMetadata::new("name", "varchar(20)", true).with_comment("Name "),
            ColumnMetadata::new("updated_at", "datetime", true).with_comment("Updated"),
        ];

        for fields in [
            FieldDescriptorBuilder::new().build_all(&columns),
            FieldDescriptorBuilder::with_policy(Padded).build_all(&columns),
        ] {
            let form = FormConfig::from_fields("user", "Users", fields).unwrap();
            let decoded = FormConfigCodec::decode(&FormConfigCodec::encode(&form)).unwrap();
            assert_eq!(decoded, form);
        }
    }

    #[test]
    fn test_decode_keeps_surrounding_whitespace() {
        let field = WireField {
            key: "name".to_string(),
            title: Some("Name ".to_string()),
            created_cell: Some(" app.cell".to_string()),
            ..Default::default()
        };

        let descriptor = FormConfigCodec::decode_field(&field).unwrap();
        assert_eq!(descriptor.title, "Name ");
        assert_eq!(descriptor.created_cell_callback.as_deref(), Some(" app.cell"));
    }

    #[test]
    fn test_defaults_filled() {
        let payload: WirePayload = serde_json::from_value(json!({
            "table": "blog_post",
            "title": "Posts",
            "fields": [{ "key": "id", "title": "ID" }]
        }))
        .unwrap();

        let form = FormConfigCodec::decode(&payload).unwrap();
        assert_eq!(form.get("id"), Some(&FieldDescriptor::new("id", "ID")));
    }

    #[test]
    fn test_unknown_input_type_rejected() {
        let field = WireField {
            key: "flag".to_string(),
            title: Some("Flag".to_string()),
            input_type: Some("checkbox".to_string()),
            ..Default::default()
        };

        let err = FormConfigCodec::decode_field(&field).unwrap_err();
        match err {
            ScaffoldError::Validation { key, message } => {
                assert_eq!(key.as_deref(), Some("flag"));
                assert!(message.contains("checkbox"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_title_rejected() {
        for title in [None, Some("   ".to_string())] {
            let field = WireField {
                key: "name".to_string(),
                title,
                ..Default::default()
            };
            let err = FormConfigCodec::decode_field(&field).unwrap_err();
            assert!(matches!(err, ScaffoldError::Validation { key: Some(k), .. } if k == "name"));
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let field = WireField {
            key: "id".to_string(),
            title: Some("ID".to_string()),
            ..Default::default()
        };
        let err =
            FormConfigCodec::decode_fields("t", "T", &[field.clone(), field]).unwrap_err();
        assert!(matches!(err, ScaffoldError::Validation { key: Some(k), .. } if k == "id"));
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(FormConfigCodec::encode(&full_form())).unwrap();
        let status = &value["fields"][0];
        assert_eq!(status["type"], "select");
        assert_eq!(status["bSortable"], false);
        assert_eq!(status["createdCell"], "");
        assert_eq!(value["fields"][1]["options"]["rangelength"], json!([2, 64]));
    }
}
