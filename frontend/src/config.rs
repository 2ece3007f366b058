use aula_client_core::ClientConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_url: env::var("AULA_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            data_dir: env::var("AULA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            timeout_secs: env::var("AULA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        Ok(ClientConfig::new(self.api_url.clone())?
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aula")
}
