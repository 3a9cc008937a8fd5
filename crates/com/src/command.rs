use {
    crate::{
        Backend, ComError,
        backend::{
            ANALYTICS_PATH, CAMERA_TOGGLE_PATH, HISTORY_PATH, SNAPSHOT_PATH,
            UPDATE_SETTINGS_PATH, VAULT_PATH,
        },
    },
    serde::{Serialize, de::DeserializeOwned},
    std::time::Duration,
    telemetry::{AnalyticsSummary, IncidentLog, SettingsPatch, TelemetrySnapshot, VaultRecord},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_VAULT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct CommandConfig {
    request_timeout: Duration,
    vault_limit: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            vault_limit: DEFAULT_VAULT_LIMIT,
        }
    }
}

impl CommandConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_vault_limit(mut self, limit: usize) -> Self {
        self.vault_limit = limit;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn vault_limit(&self) -> usize {
        self.vault_limit
    }
}

#[derive(Serialize)]
struct CameraToggle {
    enabled: bool,
}

/// Request/response side channel to the backend.
///
/// Every call is a single attempt: no retries, no idempotency key. A non-2xx
/// answer is reported as `ComError::Status`.
#[derive(Clone)]
pub struct CommandChannel {
    http: reqwest::Client,
    backend: Backend,
    config: CommandConfig,
}

impl CommandChannel {
    pub fn new(backend: Backend, config: CommandConfig) -> Result<Self, ComError> {
        // The request timeout is applied per command; the video feed shares
        // this client and streams for as long as it stays open.
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            backend,
            config,
        })
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// The underlying HTTP client, shared with the video feed reader.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `POST /camera/toggle {"enabled": ...}`
    pub async fn toggle_camera(&self, enabled: bool) -> Result<(), ComError> {
        self.post(CAMERA_TOGGLE_PATH, &CameraToggle { enabled }).await
    }

    /// `POST /update_settings` with only the fields present in `patch`.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<(), ComError> {
        patch.validate()?;
        self.post(UPDATE_SETTINGS_PATH, patch).await
    }

    /// `GET /vault?limit=N`, newest first as the backend orders them.
    pub async fn fetch_vault(&self, limit: usize) -> Result<Vec<VaultRecord>, ComError> {
        self.get(&format!("{VAULT_PATH}?limit={limit}")).await
    }

    /// Vault page of the configured default size.
    pub async fn fetch_recent_vault(&self) -> Result<Vec<VaultRecord>, ComError> {
        self.fetch_vault(self.config.vault_limit()).await
    }

    pub async fn fetch_analytics(&self) -> Result<AnalyticsSummary, ComError> {
        self.get(ANALYTICS_PATH).await
    }

    pub async fn fetch_history(&self) -> Result<Vec<IncidentLog>, ComError> {
        self.get(HISTORY_PATH).await
    }

    /// One-shot poll of the same snapshot the stream delivers.
    pub async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, ComError> {
        self.get(SNAPSHOT_PATH).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ComError> {
        let url = self.backend.http_url(path);
        log::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .timeout(self.config.request_timeout())
            .json(body)
            .send()
            .await?;
        check_status(&url, response.status())?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ComError> {
        let url = self.backend.http_url(path);
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout())
            .send()
            .await?;
        check_status(&url, response.status())?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn check_status(url: &str, status: reqwest::StatusCode) -> Result<(), ComError> {
    if status.is_success() {
        Ok(())
    } else {
        log::warn!("{} answered {}", url, status);
        Err(ComError::Status(status.as_u16()))
    }
}
