// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "charla",
    about = "Chat con personalidad configurable y base de conocimiento",
    version
)]
pub struct Cli {
    /// Gemini model id
    #[arg(short, long)]
    pub model: Option<String>,

    /// Initial persona (overrides config)
    #[arg(short, long)]
    pub persona: Option<String>,

    /// Knowledge-base file to load at startup (.txt, .md, .csv)
    #[arg(short, long)]
    pub knowledge: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,
}
