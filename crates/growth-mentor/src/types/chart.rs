//! Chart specifications embedded in model replies

use serde::{Deserialize, Serialize};

/// Kind of chart the renderer should draw
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Composed,
}

/// One plotted series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSpec {
    /// Row field holding the series values
    #[serde(rename = "key")]
    pub field: String,
    /// CSS color
    pub color: String,
    /// Legend label, defaults to the field name
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SeriesSpec {
    /// Legend label shown for this series
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

/// Chart block body, using the wire names the model is instructed to emit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_kind: ChartKind,
    pub title: String,
    #[serde(rename = "xKey")]
    pub x_field: String,
    #[serde(rename = "dataKeys")]
    pub series: Vec<SeriesSpec>,
    #[serde(rename = "data")]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// One ordered piece of a post-processed reply
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Markdown prose, possibly empty
    Prose(String),
    /// A parsed chart
    Chart(ChartSpec),
    /// A chart block that failed to parse, rendered as an inline error
    ChartError {
        /// Raw block body as emitted by the model
        raw: String,
        /// Parse failure description
        message: String,
    },
}

impl Segment {
    /// Check for a chart segment
    pub fn is_chart(&self) -> bool {
        matches!(self, Self::Chart(_))
    }

    /// Prose text, if this is a prose segment
    pub fn as_prose(&self) -> Option<&str> {
        match self {
            Self::Prose(text) => Some(text),
            _ => None,
        }
    }
}
