// src/provider/mod.rs — Conversation service boundary

pub mod google;
pub mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::errors::CharlaError;

/// Core trait for the hosted conversation service.
///
/// Three logical calls: instruction construction (local, pure — the free
/// function below), session creation, and a single message exchange against
/// an existing session.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Open a new session configured with the persona and optional knowledge
    /// base. Invalid-credential failures surface as credential errors; other
    /// failures propagate unchanged.
    async fn start_session(
        &self,
        persona: &str,
        knowledge_base: &str,
    ) -> Result<SessionHandle, CharlaError>;

    /// Forward one user message into the session and return the reply text
    /// verbatim. The session gains both turns only when the call succeeds, so
    /// a failed send leaves it retryable.
    async fn send_message(
        &self,
        session: &mut SessionHandle,
        text: &str,
    ) -> Result<String, CharlaError>;
}

/// Client-side context of one server dialogue: the instruction the session
/// was opened with plus the accumulated turns. Owned exclusively by the
/// session controller and replaced wholesale whenever the persona or
/// knowledge base changes — a replaced handle must never be sent into again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    pub id: String,
    pub system_instruction: String,
    pub history: Vec<ChatTurn>,
}

impl SessionHandle {
    pub fn new(system_instruction: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            system_instruction,
            history: Vec::new(),
        }
    }
}

/// One dialogue turn as the wire format sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

pub const KNOWLEDGE_BASE_OPEN: &str = "---INICIO BASE DE CONOCIMIENTO---";
pub const KNOWLEDGE_BASE_CLOSE: &str = "---FIN BASE DE CONOCIMIENTO---";

/// Deterministic system-instruction construction: states the persona, fixes
/// the response language, and embeds the knowledge base between delimiters
/// when one is present (blank corpora are treated as absent).
pub fn build_system_instruction(persona: &str, knowledge_base: &str) -> String {
    let mut instruction = format!(
        "Eres un asistente virtual. Tu personalidad actual es: '{persona}'. \
         Debes comunicarte siempre en español."
    );
    if !knowledge_base.trim().is_empty() {
        instruction.push_str(&format!(
            "\n\nUtiliza la siguiente información como tu base de conocimiento principal \
             para responder de manera concisa y relevante a la pregunta del usuario. \
             No menciones explícitamente que estás usando esta base de conocimiento a menos \
             que sea relevante para explicar una fuente. Simplemente integra la información \
             en tu respuesta natural:\n{KNOWLEDGE_BASE_OPEN}\n{knowledge_base}\n{KNOWLEDGE_BASE_CLOSE}"
        ));
    }
    instruction
}
