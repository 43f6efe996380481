// src/cli/chat.rs — Interactive REPL

use std::path::Path;

use crate::core::controller::ChatController;
use crate::core::message::Sender;
use crate::provider::resolver::CredentialStatus;

/// Run the interactive chat loop. Strictly a consumer of the controller's
/// observable state: status banner, message list, input line.
pub async fn run_chat(
    controller: &mut ChatController,
    startup_knowledge: Option<&str>,
) -> anyhow::Result<()> {
    eprintln!("charla v{}\n", env!("CARGO_PKG_VERSION"));
    print_banner(controller);

    if controller.credential_status() == CredentialStatus::Missing {
        // Nothing works without a credential; the banner already explains.
        return Ok(());
    }

    let mut cursor = RenderCursor::default();
    controller.initialize().await;
    render_new_messages(controller, &mut cursor);
    render_errors(controller);

    if let Some(path) = startup_knowledge {
        controller.load_knowledge_file(Path::new(path)).await;
        report_knowledge(controller);
        render_new_messages(controller, &mut cursor);
        render_errors(controller);
    }

    eprintln!("Escribe un mensaje, o /ayuda para ver los comandos.\n");

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "/salir" || trimmed == "/quit" || trimmed == "salir" {
            break;
        }

        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, controller).await;
        } else {
            if !controller.can_submit() {
                print_banner(controller);
                continue;
            }
            // Strip only the line terminator; the message itself goes verbatim.
            controller.send(input.trim_end_matches(['\r', '\n'])).await;
        }

        render_new_messages(controller, &mut cursor);
        render_errors(controller);
    }

    Ok(())
}

fn print_banner(controller: &ChatController) {
    match controller.credential_status() {
        CredentialStatus::Checking => eprintln!("Verificando la API Key..."),
        CredentialStatus::Ok => eprintln!("API Key configurada. Conectado a Gemini."),
        CredentialStatus::Missing | CredentialStatus::Error => {
            eprintln!(
                "{}",
                controller
                    .error()
                    .unwrap_or("La API Key no está disponible."),
            );
        }
    }
}

/// Tracks what has already been printed. Session rebuilds replace the whole
/// log, so the first entry's id tells a fresh log apart from an appended one.
#[derive(Default)]
struct RenderCursor {
    next: usize,
    first_id: Option<String>,
}

/// Print log entries added since the last render.
fn render_new_messages(controller: &ChatController, cursor: &mut RenderCursor) {
    let messages = controller.messages();
    let first_id = messages.first().map(|m| m.id.as_str());
    if first_id != cursor.first_id.as_deref() {
        cursor.next = 0;
        cursor.first_id = first_id.map(str::to_string);
    }
    for message in &messages[cursor.next..] {
        let prefix = match message.sender {
            Sender::User => "tú",
            Sender::Bot => "bot",
            Sender::System => "sistema",
        };
        println!("[{prefix}] {}", message.text);
    }
    cursor.next = messages.len();
}

/// The global error box: only for errors the banner does not already cover.
fn render_errors(controller: &ChatController) {
    if controller.credential_status() == CredentialStatus::Ok {
        if let Some(error) = controller.error() {
            eprintln!("Error: {error}");
        }
    } else {
        print_banner(controller);
    }
}

fn report_knowledge(controller: &ChatController) {
    if let Some(error) = controller.file_error() {
        eprintln!("  {error}");
    } else if let Some(name) = controller.knowledge_file_name() {
        eprintln!("  Archivo cargado: {name}");
    }
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

async fn handle_slash_command(input: &str, controller: &mut ChatController) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/persona" => {
            if arg.is_empty() {
                eprintln!("  Personalidad en edición: {}", controller.staged_persona());
                eprintln!("  Personalidad aplicada:   {}", controller.applied_persona());
                eprintln!("  Uso: /persona <descripción>, después /aplicar");
            } else {
                controller.set_staged_persona(arg);
                eprintln!("  Personalidad preparada. Usa /aplicar para activarla.");
            }
        }

        "/aplicar" => {
            if !controller.can_submit() {
                print_banner(controller);
                return;
            }
            if !controller.persona_dirty() {
                eprintln!("  La personalidad no ha cambiado.");
                return;
            }
            controller.apply_persona().await;
        }

        "/base" => {
            if arg.is_empty() {
                eprintln!("  Uso: /base <ruta>  (archivos .txt, .md o .csv)");
                if let Some(name) = controller.knowledge_file_name() {
                    eprintln!("  Base de conocimiento actual: {name}");
                }
                return;
            }
            if !controller.can_submit() {
                print_banner(controller);
                return;
            }
            controller.load_knowledge_file(Path::new(arg)).await;
            report_knowledge(controller);
        }

        "/estado" => {
            let status = match controller.credential_status() {
                CredentialStatus::Checking => "verificando",
                CredentialStatus::Ok => "ok",
                CredentialStatus::Missing => "sin API Key",
                CredentialStatus::Error => "API Key rechazada",
            };
            eprintln!("  Credencial: {status}");
            eprintln!("  Personalidad aplicada: {}", controller.applied_persona());
            if controller.persona_dirty() {
                eprintln!("  Personalidad en edición: {}", controller.staged_persona());
            }
            match controller.knowledge_file_name() {
                Some(name) => eprintln!("  Base de conocimiento: {name}"),
                None => eprintln!("  Base de conocimiento: ninguna"),
            }
            eprintln!(
                "  Sesión: {}",
                if controller.session_active() {
                    "activa"
                } else {
                    "inactiva"
                },
            );
            eprintln!("  Mensajes: {}", controller.messages().len());
        }

        "/ayuda" => {
            eprintln!("Comandos:");
            eprintln!("  /persona [texto]   Ver o preparar la personalidad");
            eprintln!("  /aplicar           Aplicar la personalidad preparada (reinicia el chat)");
            eprintln!("  /base <ruta>       Cargar una base de conocimiento (.txt, .md, .csv)");
            eprintln!("  /estado            Ver el estado de la sesión");
            eprintln!("  /ayuda             Mostrar esta ayuda");
            eprintln!("  /salir             Terminar");
        }

        _ => {
            eprintln!("Comando desconocido: {cmd}. Escribe /ayuda.");
        }
    }
}
