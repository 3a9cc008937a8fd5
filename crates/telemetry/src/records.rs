use {
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Info,
    #[serde(other)]
    Other,
}

/// One line of the backend's incident log, as carried in snapshots and
/// returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentLog {
    pub id: u64,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix: Option<f64>,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VaultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A stored incident returned by the vault endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
    pub timestamp: f64,
    #[serde(default)]
    pub metadata: VaultMetadata,
}

impl VaultRecord {
    pub fn display_id(&self) -> Option<i64> {
        self.id.or(self.person_id)
    }

    pub fn class_label(&self) -> &str {
        self.metadata.class.as_deref().unwrap_or("PERSON")
    }
}

/// Aggregates returned by the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_incidents: u64,
    pub danger_count: u64,
    pub warning_count: u64,
    #[serde(default)]
    pub activity_trend: Vec<f64>,
}
