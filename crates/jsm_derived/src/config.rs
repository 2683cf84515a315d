use crate::DerivedResourceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Names of the runtime types that drive mirror generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MirrorConfig {
    /// Annotation marking a form; its `value` is the form mirror.
    pub form_data_annotation: String,
    /// Annotation marking a table page; its `value` is the page mirror.
    pub page_data_annotation: String,
    /// Annotation marking a table or table extension; its `value` is the row mirror.
    pub data_annotation: String,
    /// Annotation element holding the sdk command.
    pub sdk_command_element: String,
    /// Commands that suppress generation.
    pub ignored_commands: Vec<String>,
    /// Command marking a mirror that subclasses reuse as their super class.
    pub use_command: String,
    pub value_field_interface: String,
    pub table_interface: String,
    pub column_interface: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            form_data_annotation: "org.eclipse.scout.rt.client.dto.FormData".to_string(),
            page_data_annotation: "org.eclipse.scout.rt.client.dto.PageData".to_string(),
            data_annotation: "org.eclipse.scout.rt.client.dto.Data".to_string(),
            sdk_command_element: "sdkCommand".to_string(),
            ignored_commands: vec!["IGNORE".to_string(), "USE".to_string()],
            use_command: "USE".to_string(),
            value_field_interface: "org.eclipse.scout.rt.client.ui.form.fields.IValueField".to_string(),
            table_interface: "org.eclipse.scout.rt.client.ui.basic.table.ITable".to_string(),
            column_interface: "org.eclipse.scout.rt.client.ui.basic.table.columns.IColumn".to_string(),
        }
    }
}

impl MirrorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, DerivedResourceError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DerivedResourceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DerivedResourceError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn is_ignored_command(&self, command: &str) -> bool {
        self.ignored_commands.iter().any(|ignored| ignored == command)
    }
}
