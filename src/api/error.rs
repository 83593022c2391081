//! Tipos de erro para o cliente da API LES.
//!
//! Define [`ApiError`] com variantes para falhas de rede, erros reportados
//! pelo servidor e respostas que não puderam ser decodificadas. Usa
//! `thiserror` para derivar `Display` e `Error`.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API LES.
///
/// - [`Network`](ApiError::Network): falha de transporte (DNS, conexão, timeout)
/// - [`Api`](ApiError::Api): o servidor respondeu 4xx/5xx, possivelmente com mensagem
/// - [`Decode`](ApiError::Decode): corpo de sucesso fora do formato esperado
/// - [`InvalidUrl`](ApiError::InvalidUrl): URL base não aceita segmentos de caminho
#[derive(Debug, Error)]
pub enum ApiError {
    /// Falha de rede subjacente, encapsulando o erro do `reqwest`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Erro de negócio ou validação. `message` vem do campo `message` do corpo JSON.
    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Mensagem fornecida pelo servidor, se houver e não estiver vazia.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    /// Texto a mostrar ao usuário: a mensagem do servidor ou `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
