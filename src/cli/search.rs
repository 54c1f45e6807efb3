//! `search` and `info` commands.

use anyhow::{Context, Result};

use cineseek::config::Config;
use cineseek::SubtitleSearch;

use super::display::{format_info, format_results};

pub(crate) async fn cmd_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let search = SubtitleSearch::from_config(config);
    let limit = limit.unwrap_or(config.search.result_limit);

    let results = search.search(query, limit).await;
    search.close().await;

    if json {
        let out = serde_json::to_string_pretty(&results)
            .with_context(|| "Failed to serialize results")?;
        println!("{}", out);
    } else {
        print!("{}", format_results(&results));
    }
    Ok(())
}

pub(crate) async fn cmd_info(config: &Config) -> Result<()> {
    let search = SubtitleSearch::from_config(config);
    let info = search.corpus_info().await;
    search.close().await;

    println!("{}", format_info(&info));
    Ok(())
}
