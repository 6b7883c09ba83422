//! Health checks for the configured endpoints

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use catedra::llm::HttpChatClient;
use catedra::store::{cosine_similarity, EmbeddingsClient, HttpPassageStore};
use catedra::Config;

use super::load_config;

#[derive(Parser, Debug)]
pub struct DoctorCommand {
    /// Output results as JSON
    #[arg(short, long)]
    json: bool,

    /// Also run an embedding round-trip sanity check
    #[arg(long)]
    embeddings: bool,

    /// Path to the config file (defaults to .catedra/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

pub fn run(cmd: DoctorCommand) -> Result<()> {
    let config = load_config(&cmd.config)?;

    let mut checks = vec![
        check_env(&config.provider.api_key_env, "provider api key"),
        check_env(&config.store.api_key_env, "store api key"),
    ];

    checks.push(check_provider(&config));
    checks.push(check_store(&config));

    if cmd.embeddings {
        checks.push(check_embeddings(&config));
    }

    if cmd.json {
        let report: Vec<_> = checks
            .iter()
            .map(|c| {
                serde_json::json!({
                    "check": c.name,
                    "ok": c.ok,
                    "detail": c.detail,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &checks {
            let mark = if check.ok {
                "✓".green()
            } else {
                "✗".red()
            };
            println!("{} {} - {}", mark, check.name, check.detail);
        }
    }

    Ok(())
}

fn check_env(var: &str, name: &'static str) -> Check {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Check {
            name,
            ok: true,
            detail: format!("{} is set", var),
        },
        _ => Check {
            name,
            ok: false,
            detail: format!("{} is missing", var),
        },
    }
}

fn check_provider(config: &Config) -> Check {
    let result = HttpChatClient::new(&config.provider).and_then(|client| client.list_models());

    match result {
        Ok(models) => Check {
            name: "chat endpoint",
            ok: true,
            detail: format!("{} models available", models.len()),
        },
        Err(e) => Check {
            name: "chat endpoint",
            ok: false,
            detail: format!("{:#}", e),
        },
    }
}

fn check_store(config: &Config) -> Check {
    let result =
        HttpPassageStore::new(&config.store, &config.provider).and_then(|store| store.health());

    match result {
        Ok(()) => Check {
            name: "passage store",
            ok: true,
            detail: format!("{} reachable", config.store.base_url),
        },
        Err(e) => Check {
            name: "passage store",
            ok: false,
            detail: format!("{:#}", e),
        },
    }
}

/// Embed two related phrases and make sure their similarity looks sane
fn check_embeddings(config: &Config) -> Check {
    let result = EmbeddingsClient::new(&config.provider, &config.store).and_then(|client| {
        client.embed(&[
            "recombinant vector vaccines".to_string(),
            "vaccines built on recombinant vectors".to_string(),
        ])
    });

    match result {
        Ok(vectors) => {
            let similarity = cosine_similarity(&vectors[0], &vectors[1]);
            Check {
                name: "embeddings",
                ok: similarity > 0.5,
                detail: format!(
                    "dimension {}, paraphrase similarity {:.3}",
                    vectors[0].len(),
                    similarity
                ),
            }
        }
        Err(e) => Check {
            name: "embeddings",
            ok: false,
            detail: format!("{:#}", e),
        },
    }
}
