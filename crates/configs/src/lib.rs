use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Hosted JSON-document bin holding the challan collection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_bin_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub bin_id: String,
    #[serde(default)]
    pub master_key: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_bin_base_url(),
            bin_id: String::new(),
            master_key: String::new(),
            timeout_secs: default_store_timeout(),
        }
    }
}

/// Third-party OCR endpoint used for plate recognition.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ocr_endpoint(),
            username: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_bin_base_url() -> String { "https://api.jsonbin.io/v3/b".into() }
fn default_store_timeout() -> u64 { 30 }
fn default_ocr_endpoint() -> String { "https://jaided.ai/api/ocr".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), fall back to pure
    /// environment/default configuration if the file is absent, then
    /// normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize_from_env();
        self.store.validate()?;
        self.ocr.normalize_from_env();
        self.ocr.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Fill anything the TOML left empty from environment variables.
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("CHALLAN_BIN_URL") {
                self.base_url = url;
            } else {
                self.base_url = default_bin_base_url();
            }
        }
        if self.bin_id.trim().is_empty() {
            if let Ok(id) = std::env::var("CHALLAN_BIN_ID") {
                self.bin_id = id;
            }
        }
        if self.master_key.trim().is_empty() {
            if let Ok(key) = std::env::var("CHALLAN_BIN_KEY") {
                self.master_key = key;
            }
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_store_timeout();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("store.base_url must start with http:// or https://"));
        }
        if self.bin_id.trim().is_empty() {
            return Err(anyhow!(
                "store.bin_id is empty; set it in config.toml or the CHALLAN_BIN_ID env var"
            ));
        }
        if self.master_key.trim().is_empty() {
            return Err(anyhow!(
                "store.master_key is empty; set it in config.toml or the CHALLAN_BIN_KEY env var"
            ));
        }
        Ok(())
    }
}

impl OcrConfig {
    pub fn normalize_from_env(&mut self) {
        if self.endpoint.trim().is_empty() {
            if let Ok(url) = std::env::var("OCR_URL") {
                self.endpoint = url;
            } else {
                self.endpoint = default_ocr_endpoint();
            }
        }
        if self.username.trim().is_empty() {
            if let Ok(u) = std::env::var("OCR_USERNAME") {
                self.username = u;
            }
        }
        if self.api_key.trim().is_empty() {
            if let Ok(k) = std::env::var("OCR_API_KEY") {
                self.api_key = k;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.endpoint.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("ocr.endpoint must start with http:// or https://"));
        }
        if self.api_key.trim().is_empty() {
            return Err(anyhow!(
                "ocr.api_key is empty; set it in config.toml or the OCR_API_KEY env var"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [store]
            bin_id = "abc123"
            master_key = "secret"

            [ocr]
            username = "user"
            api_key = "key"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.store.base_url, "https://api.jsonbin.io/v3/b");
        assert_eq!(cfg.store.timeout_secs, 30);
        assert_eq!(cfg.ocr.endpoint, "https://jaided.ai/api/ocr");
    }

    #[test]
    fn store_validation_requires_credentials() {
        let mut store = StoreConfig::default();
        store.base_url = "https://api.jsonbin.io/v3/b".into();
        assert!(store.validate().is_err());
        store.bin_id = "abc".into();
        store.master_key = "key".into();
        assert!(store.validate().is_ok());
        store.base_url = "ftp://nope".into();
        assert!(store.validate().is_err());
    }
}
