// src/infra/errors.rs — Error types for Charla

use thiserror::Error;

/// Everything the user sees is the `Display` text of one of these variants;
/// raw transport errors stay in the `detail` fields and only reach the logs.
#[derive(Error, Debug)]
pub enum CharlaError {
    // Credential errors — block the conversation until reconfiguration.
    #[error("Falta la API Key de Gemini. Asegúrate de que la variable de entorno API_KEY esté configurada.")]
    ApiKeyMissing,

    #[error("{message}")]
    ApiKeyRejected { message: String },

    // Provider errors
    #[error("Error de red al comunicarse con el servicio de IA. Verifica tu conexión.")]
    Network { detail: String },

    #[error("Error al comunicarse con el modelo de IA.")]
    Provider { detail: String },

    // Local file errors — shown near the upload control, never in the global
    // error field.
    #[error("Archivo no soportado. Sube archivos .txt, .md o .csv.")]
    UnsupportedFile,

    #[error("Error al leer el archivo.")]
    FileRead { detail: String },

    #[error("Error de configuración: {0}")]
    Config(String),
}

impl CharlaError {
    /// Credential-related failures downgrade the credential status to `Error`.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            CharlaError::ApiKeyMissing | CharlaError::ApiKeyRejected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_flagged() {
        assert!(CharlaError::ApiKeyMissing.is_credential_error());
        assert!(CharlaError::ApiKeyRejected {
            message: "API Key inválida".into()
        }
        .is_credential_error());
    }

    #[test]
    fn test_provider_errors_not_credential() {
        assert!(!CharlaError::Network {
            detail: "connection refused".into()
        }
        .is_credential_error());
        assert!(!CharlaError::Provider {
            detail: "HTTP 500".into()
        }
        .is_credential_error());
        assert!(!CharlaError::UnsupportedFile.is_credential_error());
    }

    #[test]
    fn test_display_hides_transport_detail() {
        let e = CharlaError::Network {
            detail: "tcp connect error 10.0.0.1:443".into(),
        };
        let text = e.to_string();
        assert!(text.contains("Error de red"));
        assert!(!text.contains("10.0.0.1"));
    }

    #[test]
    fn test_rejected_displays_its_message() {
        let e = CharlaError::ApiKeyRejected {
            message: "API Key inválida al intentar enviar mensaje. Por favor, verifique la configuración.".into(),
        };
        assert_eq!(
            e.to_string(),
            "API Key inválida al intentar enviar mensaje. Por favor, verifique la configuración."
        );
    }
}
