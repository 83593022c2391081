//! Configuração do cliente LES carregada a partir de `les.toml`.
//!
//! A struct [`LesConfig`] contém os parâmetros configuráveis. Valores não
//! presentes no arquivo usam defaults sensíveis. As variáveis de ambiente
//! `LES_API_URL`, `LES_POLL_INTERVAL_MS` e `LES_REQUEST_TIMEOUT_SECS` têm
//! precedência sobre o arquivo. Credenciais de administrador nunca passam por aqui.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_API_URL;
use crate::error::LesError;

/// Configuração de nível superior carregada de `les.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LesConfig {
    /// URL base do serviço LES, incluindo o prefixo `/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Intervalo entre consultas do loop de reconciliação, em milissegundos.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Tempo máximo de uma requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

// Valor padrão para o intervalo de polling: 2000ms.
fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for LesConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LesConfig {
    /// Carrega a configuração de `les.toml` no diretório atual e aplica o ambiente.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, LesError> {
        let mut config = Self::from_file(Path::new("les.toml"))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Lê um arquivo TOML; um arquivo ausente resulta nos defaults.
    pub fn from_file(path: &Path) -> Result<Self, LesError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Sobrescreve campos com variáveis de ambiente não vazias.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), LesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LES_API_URL")
            && !url.trim().is_empty()
        {
            self.api_url = url.trim().to_string();
        }
        if let Some(ms) = lookup("LES_POLL_INTERVAL_MS")
            && !ms.trim().is_empty()
        {
            self.poll_interval_ms = parse_env("LES_POLL_INTERVAL_MS", &ms)?;
        }
        if let Some(secs) = lookup("LES_REQUEST_TIMEOUT_SECS")
            && !secs.trim().is_empty()
        {
            self.request_timeout_secs = parse_env("LES_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LesError> {
        if self.poll_interval_ms == 0 {
            return Err(LesError::Config("poll_interval_ms must be greater than zero".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(LesError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env(key: &str, value: &str) -> Result<u64, LesError> {
    value
        .trim()
        .parse()
        .map_err(|_| LesError::Config(format!("{key} must be a whole number, got {value:?}")))
}
