//! Interactive chat session against the configured corpus

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::io::{BufRead, Write as IoWrite};
use std::path::PathBuf;

use catedra::chat::{Message, NodeKind, Role, TurnObserver, Workflow};
use catedra::llm::HttpChatClient;
use catedra::store::HttpPassageStore;

use super::load_config;

#[derive(Parser, Debug)]
pub struct ChatCommand {
    /// Path to the config file (defaults to .catedra/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Prints pipeline progress as Spanish status lines
pub struct StatusObserver;

impl TurnObserver for StatusObserver {
    fn on_node_start(&self, node: NodeKind) {
        let status = match node {
            NodeKind::RetrievePassages => "Buscando información relevante...",
            NodeKind::GenerateResponse => "Generando respuesta...",
            NodeKind::ValidateResponse => "Validando respuesta...",
        };
        println!("{}", status.dimmed());
    }
}

pub fn run(cmd: ChatCommand) -> Result<()> {
    let config = load_config(&cmd.config)?;

    let model = HttpChatClient::new(&config.provider)?;
    let store = HttpPassageStore::new(&config.store, &config.provider)?;
    let workflow = Workflow::new(Box::new(model), Box::new(store), config);

    println!("{}", "Catedra chat - escribí tu pregunta ('salir' para terminar)".bold());

    let observer = StatusObserver;
    let mut history: Vec<Message> = Vec::new();
    let stdin = std::io::stdin();

    loop {
        print!("{} ", "tú>".cyan().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "salir" | "exit" | "quit") {
            break;
        }

        history.push(Message::user(question));
        history = workflow.invoke_turn(history, &[&observer])?;

        if let Some(answer) = history.last().filter(|m| m.role == Role::Assistant) {
            println!("\n{}\n", answer.content.green());
        }
    }

    Ok(())
}
