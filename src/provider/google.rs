// src/provider/google.rs — Google Generative AI (Gemini) provider

use async_trait::async_trait;

use super::{build_system_instruction, ChatTurn, ConversationProvider, SessionHandle, TurnRole};
use crate::infra::errors::CharlaError;

const MSG_KEY_REJECTED_INIT: &str =
    "API Key inválida o error al inicializar el servicio de IA. Verifica tu API_KEY.";
const MSG_KEY_REJECTED_SEND: &str =
    "API Key inválida al intentar enviar mensaje. Por favor, verifique la configuración.";

#[derive(Debug)]
pub struct GoogleProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Construct the provider. Malformed credentials are rejected locally,
    /// before any request is made.
    pub fn new(api_key: String, model: String) -> Result<Self, CharlaError> {
        if api_key.trim().is_empty() || api_key.chars().any(char::is_whitespace) {
            return Err(CharlaError::ApiKeyRejected {
                message: MSG_KEY_REJECTED_INIT.into(),
            });
        }
        Ok(Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        })
    }

    fn base_url(&self) -> &str {
        "https://generativelanguage.googleapis.com/v1beta"
    }

    /// Build the generateContent body from the session plus the pending user
    /// turn. The pending turn only joins the session history after the
    /// provider accepts it.
    fn build_request_body(&self, session: &SessionHandle, pending: &str) -> serde_json::Value {
        let mut contents: Vec<serde_json::Value> = session
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": turn.text }],
                })
            })
            .collect();

        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": pending }],
        }));

        serde_json::json!({
            "contents": contents,
            "system_instruction": {
                "parts": [{ "text": session.system_instruction }],
            },
        })
    }
}

/// Gemini reports a bad key as HTTP 400 with an "API key not valid" message;
/// 401/403 cover revoked or mis-scoped keys.
fn is_credential_rejection(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.to_lowercase().contains("api key not valid")
}

/// Connectivity problems get their own message; everything else is a generic
/// communication failure.
fn classify_transport_error(e: reqwest::Error) -> CharlaError {
    if e.is_connect() || e.is_timeout() {
        CharlaError::Network {
            detail: e.to_string(),
        }
    } else {
        CharlaError::Provider {
            detail: e.to_string(),
        }
    }
}

/// Concatenate candidates[0].content.parts[*].text.
fn extract_reply_text(resp: &serde_json::Value) -> String {
    resp["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect()
}

#[async_trait]
impl ConversationProvider for GoogleProvider {
    fn id(&self) -> &str {
        "google"
    }

    async fn start_session(
        &self,
        persona: &str,
        knowledge_base: &str,
    ) -> Result<SessionHandle, CharlaError> {
        // The Gemini API is stateless per request: a session is the
        // client-side context carried into every generateContent call. The
        // instruction is fixed here, once, for the session's whole life.
        let instruction = build_system_instruction(persona, knowledge_base);
        tracing::debug!(model = %self.model, "nueva sesión de chat");
        Ok(SessionHandle::new(instruction))
    }

    async fn send_message(
        &self,
        session: &mut SessionHandle,
        text: &str,
    ) -> Result<String, CharlaError> {
        let body = self.build_request_body(session, text);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url(),
            self.model,
            self.api_key,
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("fallo de transporte hacia Gemini: {e}");
                classify_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if is_credential_rejection(status, &error_body) {
                return Err(CharlaError::ApiKeyRejected {
                    message: MSG_KEY_REJECTED_SEND.into(),
                });
            }
            tracing::warn!("Gemini respondió HTTP {status}: {error_body}");
            return Err(CharlaError::Provider {
                detail: format!("HTTP {status}: {error_body}"),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| CharlaError::Provider {
            detail: format!("respuesta ilegible: {e}"),
        })?;

        let reply = extract_reply_text(&resp);
        session.history.push(ChatTurn::user(text));
        session.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        GoogleProvider::new("AIzaTestKey123".into(), "gemini-2.5-flash-preview-04-17".into())
            .unwrap()
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = GoogleProvider::new("".into(), "m".into()).unwrap_err();
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_new_rejects_whitespace_key() {
        assert!(GoogleProvider::new("abc def".into(), "m".into()).is_err());
        assert!(GoogleProvider::new("   ".into(), "m".into()).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let p = provider();
        let mut session = SessionHandle::new("instrucción del sistema".into());
        session.history.push(ChatTurn::user("hola"));
        session.history.push(ChatTurn::model("buenas"));

        let body = p.build_request_body(&session, "¿cómo estás?");

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "instrucción del sistema"
        );
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "¿cómo estás?");
    }

    #[test]
    fn test_extract_reply_concatenates_parts() {
        let resp = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Hola, " }, { "text": "¿qué tal?" }],
                },
            }],
        });
        assert_eq!(extract_reply_text(&resp), "Hola, ¿qué tal?");
    }

    #[test]
    fn test_extract_reply_empty_on_missing_candidates() {
        assert_eq!(extract_reply_text(&serde_json::json!({})), "");
    }

    #[test]
    fn test_credential_rejection_by_status() {
        assert!(is_credential_rejection(
            reqwest::StatusCode::UNAUTHORIZED,
            ""
        ));
        assert!(is_credential_rejection(reqwest::StatusCode::FORBIDDEN, ""));
    }

    #[test]
    fn test_credential_rejection_by_body() {
        assert!(is_credential_rejection(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "API key not valid. Please pass a valid API key."}}"#,
        ));
        assert!(!is_credential_rejection(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "unknown field"}}"#,
        ));
    }

    #[tokio::test]
    async fn test_start_session_builds_instruction() {
        let p = provider();
        let session = p.start_session("un pirata divertido", "").await.unwrap();
        assert!(session.system_instruction.contains("un pirata divertido"));
        assert!(session.history.is_empty());
    }
}
