//! FHIR Extension model
//!
//! Only the parts of an extension the type-graph builder reads are modelled;
//! every other `value[x]` is kept in `extensions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A FHIR extension attached to a concept or element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Identifies the meaning of the extension
    #[serde(default)]
    pub url: String,

    /// String value of the extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    /// Markdown value of the extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_markdown: Option<String>,

    /// Other value[x] variants
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Extension {
    /// Create a string-valued extension
    pub fn string(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            value_string: Some(value.into()),
            ..Default::default()
        }
    }

    /// The textual value of this extension, if it carries one
    pub fn string_value(&self) -> Option<&str> {
        self.value_string
            .as_deref()
            .or(self.value_markdown.as_deref())
    }
}

/// Find the first extension whose URL ends with `suffix` and return its string value
pub fn find_string_extension<'a>(extensions: &'a [Extension], suffix: &str) -> Option<&'a str> {
    extensions
        .iter()
        .filter(|ext| ext.url.ends_with(suffix))
        .find_map(Extension::string_value)
}
