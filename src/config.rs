use std::time::Duration;

use reqwest::Url;

use crate::core::{CrmError, Result};
use crate::model::EntityKind;

/// View and gateway configuration
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Contact table on the record service
    pub contact_table: String,

    /// Deal table on the record service
    pub deal_table: String,

    /// Stage table on the record service
    pub stage_table: String,

    /// Activity table on the record service
    pub activity_table: String,

    /// Number of open deals shown on the dashboard, by value
    pub top_deals_limit: usize,

    /// Number of activities shown on the dashboard feed
    pub recent_activities_limit: usize,

    /// Pending notifications kept before the oldest are dropped
    pub notification_capacity: usize,

    /// ISO currency code used for display
    pub currency: String,
}

impl CrmConfig {
    pub fn new() -> Self {
        Self {
            contact_table: EntityKind::Contact.default_table().to_string(),
            deal_table: EntityKind::Deal.default_table().to_string(),
            stage_table: EntityKind::Stage.default_table().to_string(),
            activity_table: EntityKind::Activity.default_table().to_string(),
            top_deals_limit: 6,
            recent_activities_limit: 10,
            notification_capacity: 50,
            currency: "USD".to_string(),
        }
    }

    /// Set the table backing an entity type
    pub fn table(mut self, kind: EntityKind, table: &str) -> Self {
        let slot = match kind {
            EntityKind::Contact => &mut self.contact_table,
            EntityKind::Deal => &mut self.deal_table,
            EntityKind::Stage => &mut self.stage_table,
            EntityKind::Activity => &mut self.activity_table,
        };
        *slot = table.to_string();
        self
    }

    pub fn top_deals_limit(mut self, limit: usize) -> Self {
        self.top_deals_limit = limit;
        self
    }

    pub fn recent_activities_limit(mut self, limit: usize) -> Self {
        self.recent_activities_limit = limit;
        self
    }

    pub fn notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    pub fn table_for(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Contact => &self.contact_table,
            EntityKind::Deal => &self.deal_table,
            EntityKind::Stage => &self.stage_table,
            EntityKind::Activity => &self.activity_table,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in EntityKind::ALL {
            if self.table_for(kind).trim().is_empty() {
                return Err(CrmError::Config(format!(
                    "{} table name cannot be empty",
                    kind.label()
                )));
            }
        }

        if self.notification_capacity == 0 {
            return Err(CrmError::Config(
                "notification_capacity must be > 0".to_string(),
            ));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CrmError::Config(format!(
                "currency must be a 3-letter ISO code, got '{}'",
                self.currency
            )));
        }

        Ok(())
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection settings for the hosted record service
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL, without a trailing slash
    pub base_url: String,

    /// Project the tables belong to
    pub project_id: String,

    /// Public API key, if the project requires one
    pub public_key: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl HttpStoreConfig {
    pub fn new(base_url: &str, project_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            public_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn public_key(mut self, key: &str) -> Self {
        self.public_key = Some(key.to_string());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parse from a connection string
    ///
    /// Format: `http[s]://[public_key@]host[:port][/path]?project=<id>`
    ///
    /// The key and the project id are percent-decoded.
    ///
    /// ```ignore
    /// let config = HttpStoreConfig::from_url(
    ///     "https://pk_live_123@records.example.com/api?project=crm"
    /// )?;
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| CrmError::Config(format!("Invalid URL '{}': {}", url, e)))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(CrmError::Config(format!("Unsupported scheme '{}'", scheme)));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CrmError::Config("Missing host".to_string()))?;

        let project_id = parsed
            .query_pairs()
            .find(|(key, _)| key == "project")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CrmError::Config("Missing 'project' parameter".to_string()))?;

        let mut base_url = format!("{}://{}", scheme, host);
        if let Some(port) = parsed.port() {
            base_url.push_str(&format!(":{}", port));
        }
        base_url.push_str(parsed.path().trim_end_matches('/'));

        let mut config = Self::new(&base_url, &project_id);
        let key = percent_decode(parsed.username());
        if !key.is_empty() {
            config = config.public_key(&key);
        }
        Ok(config)
    }

    /// Convert to a connection string with the key masked
    pub fn to_url(&self) -> String {
        let (scheme, host_path) = self
            .base_url
            .split_once("://")
            .unwrap_or(("https", self.base_url.as_str()));
        match self.public_key {
            Some(_) => format!("{}://***@{}?project={}", scheme, host_path, self.project_id),
            None => format!("{}://{}?project={}", scheme, host_path, self.project_id),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(CrmError::Config("base_url cannot be empty".to_string()));
        }

        if self.project_id.trim().is_empty() {
            return Err(CrmError::Config("project_id cannot be empty".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(CrmError::Config("request_timeout must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Decodes `%XX` escapes; malformed escapes are kept as written.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push(((hi << 4) + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
