use crate::error::{RelayError, Result};
use crate::models::WorkflowConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;
pub const DEFAULT_NODE_ID: &str = "40";
pub const DEFAULT_FIELD_NAME: &str = "image";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the RunningHub API.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub workflow: WorkflowConfig,
    pub staging_dir: PathBuf,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    pub fn new(
        host: impl AsRef<str>,
        api_key: impl Into<String>,
        workflow_id: impl Into<String>,
    ) -> Self {
        ProviderConfig {
            base_url: normalize_base_url(host.as_ref()),
            api_key: api_key.into(),
            workflow: WorkflowConfig::new(workflow_id),
            staging_dir: env::temp_dir(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required(&lookup, "RUNNINGHUB_URL")?;
        let api_key = required(&lookup, "RUNNINGHUB_API_KEY")?;
        let workflow_id = required(&lookup, "RUNNINGHUB_WORKFLOW_ID")?;

        let mut config = ProviderConfig::new(host, api_key, workflow_id);

        if let Some(node_id) = lookup("RUNNINGHUB_NODE_ID").filter(|v| !v.is_empty()) {
            config.workflow.node_id = node_id;
        }
        if let Some(field_name) = lookup("RUNNINGHUB_FIELD_NAME").filter(|v| !v.is_empty()) {
            config.workflow.field_name = field_name;
        }
        if let Some(dir) = lookup("UPLOAD_DIR").filter(|v| !v.is_empty()) {
            config.staging_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_workflow(mut self, workflow: WorkflowConfig) -> Self {
        self.workflow = workflow;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_limit: usize,
    pub provider: ProviderConfig,
}

impl Config {
    pub fn new(provider: ProviderConfig) -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
            provider,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = ProviderConfig::from_lookup(&lookup)?;
        let host = lookup("HOST")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let upload_limit = lookup("UPLOAD_LIMIT_BYTES")
            .and_then(|limit| limit.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_LIMIT);

        Ok(Config {
            host,
            port,
            upload_limit,
            provider,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RelayError::Config(format!("{} is not set", key)))
}

/// Hosts are configured bare (`www.runninghub.cn`); an explicit scheme wins.
fn normalize_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("RUNNINGHUB_URL", "www.runninghub.cn"),
            ("RUNNINGHUB_API_KEY", "secret"),
            ("RUNNINGHUB_WORKFLOW_ID", "1850000000000000000"),
        ]))
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.upload_limit, 5 * 1024 * 1024);
        assert_eq!(config.provider.base_url, "https://www.runninghub.cn");
        assert_eq!(config.provider.workflow.node_id, "40");
        assert_eq!(config.provider.workflow.field_name, "image");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("RUNNINGHUB_URL", "http://127.0.0.1:9000/"),
            ("RUNNINGHUB_API_KEY", "secret"),
            ("RUNNINGHUB_WORKFLOW_ID", "wf"),
            ("RUNNINGHUB_NODE_ID", "12"),
            ("PORT", "8081"),
            ("UPLOAD_LIMIT_BYTES", "1024"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.provider.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.provider.workflow.node_id, "12");
        assert_eq!(config.port, 8081);
        assert_eq!(config.upload_limit, 1024);
        assert_eq!(config.provider.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[
            ("RUNNINGHUB_URL", "www.runninghub.cn"),
            ("RUNNINGHUB_WORKFLOW_ID", "wf"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("RUNNINGHUB_API_KEY"));
    }
}
