use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPLANATION_ICON: &str = "activity";

/// Contents of a dashboard explanation panel.
///
/// Too large to embed in a history entry, so it travels through the session
/// store instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub values: Vec<ExplanationValue>,
    #[serde(default)]
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationValue {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ExplanationPayload {
    /// Icon identifier to render, restored from its serialized name.
    pub fn icon_name(&self) -> &str {
        self.icon
            .as_deref()
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_EXPLANATION_ICON)
    }
}
