//! Load pre-extracted text documents into the passage store
//!
//! Takes plain text or markdown that already went through whatever
//! PDF/OCR conversion the corpus needed. Files are chunked with a
//! character window and embedded in batches.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use catedra::store::{Document, HttpPassageStore};

use super::load_config;

/// Documents embedded per store request
const BATCH_SIZE: usize = 64;

#[derive(Parser, Debug)]
pub struct IngestCommand {
    /// Text or markdown files to load
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Chunk size in characters
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, default_value_t = 100)]
    overlap: usize,

    /// Path to the config file (defaults to .catedra/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(cmd: IngestCommand) -> Result<()> {
    if cmd.overlap >= cmd.chunk_size {
        anyhow::bail!("Overlap must be smaller than chunk size");
    }

    let config = load_config(&cmd.config)?;
    let store = HttpPassageStore::new(&config.store, &config.provider)?;

    let mut documents = Vec::new();

    for path in &cmd.paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());

        let chunks = split_text(&text, cmd.chunk_size, cmd.overlap);
        println!("Loaded {} chunks from {:?}", chunks.len(), path);

        documents.extend(chunks.into_iter().map(|content| Document {
            content,
            source: source.clone(),
        }));
    }

    let mut inserted = 0;
    for batch in documents.chunks(BATCH_SIZE) {
        inserted += store.insert(batch)?;
    }

    println!("{}", format!("Embedded {} chunks in total", inserted).green());

    Ok(())
}

/// Character-window chunking with overlap, safe across multi-byte text
fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();

        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("una vacuna", 1000, 100);
        assert_eq!(chunks, vec!["una vacuna"]);
    }

    #[test]
    fn test_chunks_overlap() {
        let text = "abcdefghij";
        let chunks = split_text(text, 4, 2);

        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[1], "cdef");
        // Consecutive chunks share the overlap region
        assert!(chunks[1].starts_with(&chunks[0][2..]));
    }

    #[test]
    fn test_full_coverage() {
        let text = "x".repeat(2500);
        let chunks = split_text(&text, 1000, 100);

        // Steps of 900: chunks start at 0, 900, 1800
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[2].len(), 700);
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let text = "ñáéíóú".repeat(300);
        let chunks = split_text(&text, 100, 10);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", 1000, 100).is_empty());
        assert!(split_text("   \n  ", 1000, 100).is_empty());
    }
}
