use crate::descriptor::FieldDescriptor;
use crate::{Result, ScaffoldError};
use indexmap::IndexMap;

/// Ordered set of field descriptors for one table.
///
/// Insertion order is emission order, both for the view columns and for the
/// controller's search conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub table: String,
    pub title: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FormConfig {
    pub fn new(table: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            title: title.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn from_fields(
        table: impl Into<String>,
        title: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self> {
        let mut form = Self::new(table, title);
        for field in fields {
            form.insert(field)?;
        }
        Ok(form)
    }

    /// Append a descriptor; keys must be unique
    pub fn insert(&mut self, mut field: FieldDescriptor) -> Result<()> {
        if self.fields.contains_key(&field.key) {
            return Err(ScaffoldError::invalid_field(field.key, "duplicate key"));
        }
        // A blank callback is the same as none
        if field
            .created_cell_callback
            .as_deref()
            .map_or(false, |callback| callback.trim().is_empty())
        {
            field.created_cell_callback = None;
        }
        self.fields.insert(field.key.clone(), field);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
