//! One-shot question against the configured corpus

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use catedra::chat::{Message, Role, Workflow};
use catedra::llm::HttpChatClient;
use catedra::store::HttpPassageStore;

use super::chat::StatusObserver;
use super::load_config;

#[derive(Parser, Debug)]
pub struct AskCommand {
    /// Question to answer from the corpus
    question: String,

    /// Path to the config file (defaults to .catedra/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(cmd: AskCommand) -> Result<()> {
    let config = load_config(&cmd.config)?;

    let model = HttpChatClient::new(&config.provider)?;
    let store = HttpPassageStore::new(&config.store, &config.provider)?;
    let workflow = Workflow::new(Box::new(model), Box::new(store), config);

    let observer = StatusObserver;
    let history = workflow.invoke_turn(vec![Message::user(cmd.question)], &[&observer])?;

    if let Some(answer) = history.last().filter(|m| m.role == Role::Assistant) {
        println!("\n{}", answer.content.green());
    }

    Ok(())
}
