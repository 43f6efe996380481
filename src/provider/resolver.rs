// src/provider/resolver.rs — Startup credential resolution

use std::sync::Arc;

use super::google::GoogleProvider;
use super::ConversationProvider;
use crate::infra::errors::CharlaError;

/// Process-wide credential state, as the status banner sees it.
///
/// Set once at startup (Checking→Ok or Checking→Missing). May later move
/// Ok→Error when a provider call reveals an invalid credential. `Missing` and
/// `Error` are terminal until the credential is reconfigured and the process
/// restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Checking,
    Ok,
    Missing,
    Error,
}

/// Outcome of the one-time startup resolution.
pub struct CredentialResolution {
    pub status: CredentialStatus,
    pub provider: Option<Arc<dyn ConversationProvider>>,
    pub error: Option<String>,
}

/// Turn the injected credential into a usable provider. Runs exactly once per
/// process; there is no retry here. The caller does the env/config read and
/// passes the winning value in.
pub fn resolve_credential(api_key: Option<&str>, model: &str) -> CredentialResolution {
    let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
        return CredentialResolution {
            status: CredentialStatus::Missing,
            provider: None,
            error: Some(CharlaError::ApiKeyMissing.to_string()),
        };
    };

    match GoogleProvider::new(key.to_string(), model.to_string()) {
        Ok(provider) => CredentialResolution {
            status: CredentialStatus::Ok,
            provider: Some(Arc::new(provider)),
            error: None,
        },
        Err(e) => {
            tracing::error!("no se pudo inicializar el servicio de IA: {e}");
            CredentialResolution {
                status: CredentialStatus::Error,
                provider: None,
                error: Some(e.to_string()),
            }
        }
    }
}
