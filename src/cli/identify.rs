//! `identify` and `phrases` commands.

use std::sync::Arc;

use anyhow::{Context, Result};

use cineseek::config::Config;
use cineseek::phrases::{extract_phrases, select_best_phrases};
use cineseek::{Identifier, SubtitleSearch};

use super::display::format_identification;
use super::TranscriptInput;

pub(crate) async fn cmd_identify(config: &Config, input: &TranscriptInput, json: bool) -> Result<()> {
    let transcript = input.read()?;

    let search = Arc::new(SubtitleSearch::from_config(config));
    let identifier = Identifier::new(Arc::clone(&search), config);
    let outcome = identifier.identify(&transcript).await;
    search.close().await;

    if json {
        let out = serde_json::to_string_pretty(&outcome)
            .with_context(|| "Failed to serialize identification")?;
        println!("{}", out);
    } else {
        print!("{}", format_identification(&outcome));
    }
    Ok(())
}

pub(crate) fn cmd_phrases(
    config: &Config,
    input: &TranscriptInput,
    length: Option<usize>,
    count: Option<usize>,
) -> Result<()> {
    let transcript = input.read()?;
    let length = length.unwrap_or(config.phrases.phrase_length);
    let count = count.unwrap_or(config.phrases.phrase_count);

    let best = select_best_phrases(
        extract_phrases(&transcript, length),
        count,
        config.phrases.scoring,
    );
    if best.is_empty() {
        println!("No phrases of {} words found.", length);
    }
    for phrase in best {
        println!("{}", phrase);
    }
    Ok(())
}
