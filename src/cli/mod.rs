//! Command handlers for the `cineseek` binary.

mod display;
mod identify;
mod search;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

pub(crate) use identify::{cmd_identify, cmd_phrases};
pub(crate) use search::{cmd_info, cmd_search};

/// Where transcript text comes from. Reads stdin when neither flag is set.
#[derive(Args, Debug, Clone)]
pub(crate) struct TranscriptInput {
    /// Transcript text
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,
    /// File containing the transcript
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl TranscriptInput {
    pub(crate) fn read(&self) -> Result<String> {
        let text = match (&self.text, &self.file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcript: {}", path.display()))?,
            (None, None) => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .with_context(|| "Failed to read transcript from stdin")?;
                buf
            }
        };

        if text.trim().is_empty() {
            bail!("Transcript is empty");
        }
        Ok(text)
    }
}
