//! Human-readable rendering of search output.

use cineseek::search::{CorpusInfo, MatchResult};
use cineseek::Identification;

/// Seconds as `h:mm:ss`.
pub(crate) fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

pub(crate) fn format_results(results: &[MatchResult]) -> String {
    if results.is_empty() {
        return "No matching movies found.".to_string();
    }

    let mut out = String::new();
    for (rank, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})  score {:.3}  [{}]\n",
            rank + 1,
            r.movie_title,
            r.year,
            r.match_score,
            r.source.as_str()
        ));
        out.push_str(&format!(
            "   \"{}\" at {}\n",
            r.subtitle_text.trim(),
            format_timestamp(r.start_time)
        ));
        if !r.genres.is_empty() {
            out.push_str(&format!("   {}\n", r.genres.join(", ")));
        }
    }
    out
}

pub(crate) fn format_identification(id: &Identification) -> String {
    let mut out = String::new();
    out.push_str("Phrases searched:\n");
    for phrase in &id.phrases {
        out.push_str(&format!("  - {}\n", phrase));
    }
    if id.timed_out {
        out.push_str("(deadline reached, results may be partial)\n");
    }
    out.push('\n');
    out.push_str(&format_results(&id.results));
    out
}

pub(crate) fn format_info(info: &CorpusInfo) -> String {
    match info {
        CorpusInfo::Connected {
            total_documents,
            profile,
            connected_at,
            ..
        } => format!(
            "Status: connected\nProfile: {}\nDocuments: {}\nConnected at: {}",
            profile,
            total_documents,
            connected_at.to_rfc3339()
        ),
        CorpusInfo::NotConnected { error } => match error {
            Some(e) => format!("Status: not_connected\nReason: {}", e),
            None => "Status: not_connected".to_string(),
        },
        CorpusInfo::Error { error } => format!("Status: error\nError: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cineseek::search::RetrievalTier;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00:00");
        assert_eq!(format_timestamp(3725.4), "1:02:05");
        assert_eq!(format_timestamp(-3.0), "0:00:00");
    }

    #[test]
    fn test_format_results() {
        let results = vec![MatchResult {
            movie_title: "Inception".into(),
            year: "2010".into(),
            subtitle_text: "We need to go deeper.".into(),
            match_score: 2.0,
            source: RetrievalTier::Substring,
            imdb_id: "tt1375666".into(),
            genres: vec!["Action".into()],
            overview: String::new(),
            start_time: 3600.0,
            end_time: 3602.0,
            vote_average: 8.1,
            vote_count: 14075,
        }];
        let text = format_results(&results);
        assert!(text.starts_with("1. Inception (2010)  score 2.000  [substring]"));
        assert!(text.contains("at 1:00:00"));
        assert_eq!(format_results(&[]), "No matching movies found.");
    }
}
