// src/core/controller.rs — Conversation session state machine

use std::path::Path;
use std::sync::Arc;

use crate::core::knowledge::{self, KnowledgeBase};
use crate::core::message::{Message, MessageLog, Sender};
use crate::core::staging::PersonaStaging;
use crate::provider::resolver::{CredentialResolution, CredentialStatus};
use crate::provider::{ConversationProvider, SessionHandle};

const MSG_SESSION_INACTIVE: &str =
    "La sesión de chat no está activa. Por favor, espera a que se inicialice o aplica una personalidad.";
const MSG_SERVICE_NOT_READY: &str =
    "El servicio de IA no está listo. Verifique la configuración de la API Key.";

/// Owns the conversation state machine: when the session is (re)created, how
/// a user message is routed into it, and how failures surface as observable
/// state.
///
/// Conceptually the machine moves through Idle, Initializing, Ready(session),
/// Sending(session) and Failed(reason). The combination of loading flag,
/// session handle and error field encodes which state is current; the
/// loading flag is the sole re-entrancy gate, and every method runs to
/// completion before another can start.
pub struct ChatController {
    provider: Option<Arc<dyn ConversationProvider>>,
    credential_status: CredentialStatus,
    session: Option<SessionHandle>,
    log: MessageLog,
    loading: bool,
    error: Option<String>,
    persona: PersonaStaging,
    knowledge: KnowledgeBase,
}

impl ChatController {
    pub fn new(resolution: CredentialResolution, default_persona: &str) -> Self {
        Self {
            provider: resolution.provider,
            credential_status: resolution.status,
            session: None,
            log: MessageLog::new(),
            loading: false,
            error: resolution.error,
            persona: PersonaStaging::new(default_persona),
            knowledge: KnowledgeBase::default(),
        }
    }

    /// First entry into transition 1: fires once the startup credential check
    /// lands on `Ok`. A `Missing` or `Error` outcome leaves the log empty and
    /// the conversation blocked.
    pub async fn initialize(&mut self) {
        if self.credential_status == CredentialStatus::Ok {
            self.rebuild_session().await;
        }
    }

    /// Transition 1: tear the session down and build a fresh one from the
    /// applied persona and knowledge base. The old handle is dead either way;
    /// on success the visible log is replaced by a single system message,
    /// because the prior turns belong to a context that no longer exists.
    async fn rebuild_session(&mut self) {
        if self.credential_status != CredentialStatus::Ok {
            // Missing/Error already carry their own banner text.
            if self.credential_status == CredentialStatus::Checking {
                self.error = Some(MSG_SERVICE_NOT_READY.into());
            }
            return;
        }
        let Some(provider) = self.provider.clone() else {
            self.error = Some(MSG_SERVICE_NOT_READY.into());
            return;
        };

        self.loading = true;
        self.error = None;

        match provider
            .start_session(self.persona.applied(), self.knowledge.content())
            .await
        {
            Ok(session) => {
                self.session = Some(session);
                let suffix = if self.knowledge.is_loaded() {
                    "Con base de conocimiento."
                } else {
                    "Sin base de conocimiento adicional."
                };
                self.log.reset_with_system(format!(
                    "Chat iniciado/actualizado. Personalidad: \"{}\". {}",
                    self.persona.applied(),
                    suffix,
                ));
                tracing::info!(persona = %self.persona.applied(), "sesión de chat lista");
            }
            Err(e) => {
                self.session = None;
                self.error = Some(e.to_string());
                if e.is_credential_error() {
                    self.credential_status = CredentialStatus::Error;
                }
                tracing::warn!("no se pudo iniciar la sesión de chat: {e}");
            }
        }
        self.loading = false;
    }

    /// Transitions 2–4: route one user submission.
    pub async fn send(&mut self, input: &str) {
        // Empty input and in-flight requests are silent no-ops.
        if input.trim().is_empty() || self.loading {
            return;
        }

        // No Ready session — still initializing, failed at startup, or the
        // credential stopped being usable. Reject with an explanation and
        // leave the log untouched.
        if self.credential_status != CredentialStatus::Ok {
            self.error = Some(MSG_SESSION_INACTIVE.into());
            return;
        }
        let Some(provider) = self.provider.clone() else {
            self.error = Some(MSG_SESSION_INACTIVE.into());
            return;
        };
        let Some(mut session) = self.session.take() else {
            self.error = Some(MSG_SESSION_INACTIVE.into());
            return;
        };

        // Phase one: the user's message joins the log before the provider
        // answers.
        self.log.push(Sender::User, input);
        self.loading = true;
        self.error = None;

        let result = provider.send_message(&mut session, input).await;
        // A failed send never invalidates the handle; only a rebuild replaces it.
        self.session = Some(session);

        // Phase two: reconcile with the provider's outcome.
        match result {
            Ok(reply) => {
                self.log.push(Sender::Bot, reply);
            }
            Err(e) => {
                let text = e.to_string();
                self.log.push(Sender::System, format!("Error: {text}"));
                self.error = Some(text);
                if e.is_credential_error() {
                    self.credential_status = CredentialStatus::Error;
                }
                tracing::warn!("fallo al enviar el mensaje: {e}");
            }
        }
        self.loading = false;
    }

    /// Stage a persona edit. Local only; nothing else moves.
    pub fn set_staged_persona(&mut self, text: impl Into<String>) {
        self.persona.set_staged(text);
    }

    /// Apply the staged persona. A no-op when staged equals applied, so an
    /// unchanged persona never churns the session.
    pub async fn apply_persona(&mut self) {
        if self.loading {
            return;
        }
        if !self.persona.apply() {
            return;
        }
        self.rebuild_session().await;
    }

    /// Load a reference document into the knowledge base. Acceptance replaces
    /// the corpus wholesale; an unsupported kind or read failure clears it
    /// and leaves a local error by the upload control. Either way the session
    /// is rebuilt when the applied value actually changed.
    pub async fn load_knowledge_file(&mut self, path: &Path) {
        if self.loading {
            return;
        }
        let changed = match knowledge::read_knowledge_file(path).await {
            Ok(content) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("archivo")
                    .to_string();
                self.knowledge.accept(name, content)
            }
            Err(e) => self.knowledge.reject(e.to_string()),
        };
        if changed {
            self.rebuild_session().await;
        }
    }

    // ─── Observable state (the whole presentation contract) ────────────────

    pub fn credential_status(&self) -> CredentialStatus {
        self.credential_status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn staged_persona(&self) -> &str {
        self.persona.staged()
    }

    pub fn applied_persona(&self) -> &str {
        self.persona.applied()
    }

    pub fn persona_dirty(&self) -> bool {
        self.persona.is_dirty()
    }

    pub fn knowledge_loaded(&self) -> bool {
        self.knowledge.is_loaded()
    }

    pub fn knowledge_file_name(&self) -> Option<&str> {
        self.knowledge.file_name()
    }

    pub fn file_error(&self) -> Option<&str> {
        self.knowledge.file_error()
    }

    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    /// Presentation gate: inputs stay disabled while a request is in flight
    /// or the credential is unusable.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.credential_status == CredentialStatus::Ok
    }
}
