use {
    crate::TelemetryError,
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.40;

/// Remote run-time settings of the inference backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "conf_threshold")]
    pub confidence_threshold: f32,
    pub draw_on_server: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            draw_on_server: false,
        }
    }
}

impl Settings {
    /// Merge the fields present in `patch`.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(threshold) = patch.confidence_threshold {
            self.confidence_threshold = threshold;
        }
        if let Some(draw) = patch.draw_on_server {
            self.draw_on_server = draw;
        }
    }

    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// A partial settings update. Only present fields are sent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(
        rename = "conf_threshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_on_server: Option<bool>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    pub fn with_draw_on_server(mut self, draw: bool) -> Self {
        self.draw_on_server = Some(draw);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.confidence_threshold.is_none() && self.draw_on_server.is_none()
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if let Some(threshold) = self.confidence_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(TelemetryError::InvalidSetting(format!(
                    "conf_threshold {} outside [0, 1]",
                    threshold
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(self)?)
    }
}
