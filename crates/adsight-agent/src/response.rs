//! Response types returned to the front end.
//!
//! The serialized shapes (`{"type": "composite", "content": {"sections":
//! [...]}}`, section tags, `chartType`, `dataKey`, `followupSuggestions`)
//! are the rendering contract and must not drift.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use adsight_data::{CalculatedMetrics, MetricRow};

/// One incoming chat message. `content` is either plain text or an opaque
/// prior-response object the front end echoed back for context.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl ChatMessage {
    /// The text of this message, if its content is a string.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// The agent's reply: plain text or a composite of narrative plus
/// chart/table sections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AgentResponse {
    Text {
        content: String,
    },
    Composite {
        content: CompositeContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<ResponseContext>,
    },
}

impl AgentResponse {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositeContent {
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CalculatedMetrics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Section {
    Narrative(String),
    Chart(ChartContent),
    /// Table rows as free-form JSON: campaign/account listings or parsed
    /// research results.
    Table(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Bar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartContent {
    #[serde(rename = "chartType")]
    pub chart_type: ChartType,
    pub title: String,
    pub data: Vec<MetricRow>,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "xAxis")]
    pub x_axis: String,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    #[serde(rename = "dataKey")]
    pub data_key: String,
    pub name: String,
    pub color: String,
}

impl ChartSeries {
    pub(crate) fn new(data_key: &str, name: &str, color: &str) -> Self {
        Self {
            data_key: data_key.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Follow-up hints and the filters a response was built under.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niche: Option<String>,
    #[serde(
        rename = "followupSuggestions",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub followup_suggestions: Vec<String>,
}
