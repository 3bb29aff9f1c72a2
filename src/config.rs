//! Configuração do dataproc-watch carregada a partir de `dataproc-watch.toml`.
//!
//! A struct [`WatchConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `DATAPROC_PROJECT`, `DATAPROC_REGION` e
//! `GOOGLE_OAUTH_ACCESS_TOKEN` têm precedência sobre o arquivo; flags da CLI
//! têm precedência sobre ambos.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::WatchError;
use crate::{dataproc, storage};
use crate::waiter::WaitOptions;

pub const CONFIG_FILE: &str = "dataproc-watch.toml";

/// Configuração de nível superior carregada de `dataproc-watch.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Projeto GCP dono dos jobs.
    #[serde(default)]
    pub project_id: String,

    /// Região do Dataproc (`global` por padrão).
    #[serde(default = "default_region")]
    pub region: String,

    /// Token OAuth já emitido, enviado como `Authorization: Bearer`.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_dataproc_endpoint")]
    pub dataproc_endpoint: String,

    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,

    /// Intervalo entre leituras da saída do driver, em milissegundos.
    #[serde(default = "default_output_poll_ms")]
    pub output_poll_ms: u64,

    /// Intervalo entre consultas de status do job, em milissegundos.
    #[serde(default = "default_status_poll_ms")]
    pub status_poll_ms: u64,

    /// Tempo extra para capturar saída depois que o job termina.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Tempo máximo de espera. Ausente significa sem limite.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_region() -> String {
    "global".to_string()
}

fn default_dataproc_endpoint() -> String {
    dataproc::client::API_URL.to_string()
}

fn default_storage_endpoint() -> String {
    storage::client::API_URL.to_string()
}

// 1s: a saída é barata de consultar.
fn default_output_poll_ms() -> u64 {
    1000
}

// 10s: a API do Dataproc tem cota por minuto.
fn default_status_poll_ms() -> u64 {
    10_000
}

fn default_grace_period_ms() -> u64 {
    10_000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            region: default_region(),
            access_token: None,
            dataproc_endpoint: default_dataproc_endpoint(),
            storage_endpoint: default_storage_endpoint(),
            output_poll_ms: default_output_poll_ms(),
            status_poll_ms: default_status_poll_ms(),
            grace_period_ms: default_grace_period_ms(),
            timeout_secs: None,
        }
    }
}

impl WatchConfig {
    /// Carrega a configuração de `dataproc-watch.toml` no diretório atual e
    /// aplica as variáveis de ambiente.
    pub fn load() -> Result<Self, WatchError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Lê um arquivo específico. Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self, WatchError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<WatchConfig>(&contents)?)
    }

    /// Sobrescreve campos com variáveis de ambiente não vazias.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(project) = get("DATAPROC_PROJECT") {
            self.project_id = project;
        }
        if let Some(region) = get("DATAPROC_REGION") {
            self.region = region;
        }
        if let Some(token) = get("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
    }

    /// Garante que há um projeto configurado.
    pub fn require_project(&self) -> Result<&str, WatchError> {
        if self.project_id.trim().is_empty() {
            return Err(WatchError::Config(format!(
                "no project configured; set project_id in {CONFIG_FILE}, DATAPROC_PROJECT or --project"
            )));
        }
        Ok(&self.project_id)
    }

    /// Opções de espera derivadas da configuração (objetivo `DONE`, sem streaming).
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            output_poll: Duration::from_millis(self.output_poll_ms),
            status_poll: Duration::from_millis(self.status_poll_ms),
            grace_period: Duration::from_millis(self.grace_period_ms),
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..WaitOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let config = WatchConfig::default();
        assert_eq!(config.region, "global");
        assert_eq!(config.output_poll_ms, 1000);
        assert_eq!(config.status_poll_ms, 10_000);
        assert_eq!(config.grace_period_ms, 10_000);
        assert!(config.timeout_secs.is_none());
        assert!(config.project_id.is_empty());
        assert!(config.access_token.is_none());
        assert_eq!(config.dataproc_endpoint, dataproc::client::API_URL);
        assert_eq!(config.storage_endpoint, storage::client::API_URL);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            project_id = "analytics-prod"
            status_poll_ms = 30000
            timeout_secs = 3600
        "#;
        let config: WatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_id, "analytics-prod");
        assert_eq!(config.status_poll_ms, 30_000);
        assert_eq!(config.timeout_secs, Some(3600));
        assert_eq!(config.region, "global");
        assert_eq!(config.output_poll_ms, 1000);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WatchConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.status_poll_ms, 10_000);
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "project_id = \"p1\"\nregion = \"europe-west1\"\n").unwrap();

        let config = WatchConfig::load_from(&path).unwrap();
        assert_eq!(config.project_id, "p1");
        assert_eq!(config.region, "europe-west1");
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "status_poll_ms = \"often\"").unwrap();

        assert!(matches!(
            WatchConfig::load_from(&path),
            Err(WatchError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("DATAPROC_PROJECT", "from-env"),
            ("DATAPROC_REGION", ""),
            ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.token"),
        ]
        .into();
        let mut config = WatchConfig {
            project_id: "from-file".into(),
            region: "us-central1".into(),
            ..Default::default()
        };
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.project_id, "from-env");
        // Empty variables are ignored.
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
    }

    #[test]
    fn require_project_rejects_blank() {
        let config = WatchConfig::default();
        assert!(matches!(config.require_project(), Err(WatchError::Config(_))));

        let config = WatchConfig {
            project_id: "p".into(),
            ..Default::default()
        };
        assert_eq!(config.require_project().unwrap(), "p");
    }

    #[test]
    fn wait_options_follow_config() {
        let config = WatchConfig {
            output_poll_ms: 250,
            status_poll_ms: 5000,
            timeout_secs: Some(60),
            ..Default::default()
        };
        let options = config.wait_options();
        assert_eq!(options.output_poll, Duration::from_millis(250));
        assert_eq!(options.status_poll, Duration::from_secs(5));
        assert_eq!(options.timeout, Some(Duration::from_secs(60)));
        assert!(!options.stream_output);
    }
}
