//! Lyric language detection
//!
//! Lines are grouped into chunks of three, each chunk is classified on its
//! own and the most frequent language wins. Classification failures only cost
//! a vote.

use whatlang::Lang;

/// Lines per classified chunk
const CHUNK_LINES: usize = 3;

/// Chunks shorter than this (trimmed, in characters) are not classified
const MIN_CHUNK_CHARS: usize = 10;

/// Result when no chunk could be classified
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Detect the dominant language of a song's lyric lines
///
/// Returns a two-letter code where one exists (`"en"`, `"es"`, ...), the
/// three-letter code otherwise, or `"unknown"`.
pub fn detect_language(lines: &[String]) -> String {
    let votes: Vec<&'static str> = lines
        .chunks(CHUNK_LINES)
        .map(|chunk| chunk.join(" "))
        .filter(|text| text.trim().chars().count() >= MIN_CHUNK_CHARS)
        .filter_map(|text| classify_chunk(&text))
        .collect();

    let language = majority_vote(&votes).unwrap_or(UNKNOWN_LANGUAGE);
    tracing::debug!(chunks = votes.len(), language, "Language detected");
    language.to_string()
}

/// Classify one chunk; `None` when the classifier gives up
fn classify_chunk(text: &str) -> Option<&'static str> {
    whatlang::detect(text).map(|info| language_code(info.lang()))
}

/// Most frequent vote; ties go to the language seen first
fn majority_vote(votes: &[&'static str]) -> Option<&'static str> {
    // Tally kept in first-seen order
    let mut tally: Vec<(&'static str, usize)> = Vec::new();
    for vote in votes {
        match tally.iter_mut().find(|(lang, _)| lang == vote) {
            Some(entry) => entry.1 += 1,
            None => tally.push((vote, 1)),
        }
    }

    let best = tally.iter().map(|(_, count)| *count).max()?;
    tally
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(lang, _)| lang)
}

/// ISO 639-1 code for the languages the import queries know about
fn language_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Swe => "sv",
        Lang::Pol => "pl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Tel => "te",
        Lang::Tam => "ta",
        Lang::Kor => "ko",
        Lang::Jpn => "ja",
        Lang::Cmn => "zh",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        other => other.code(),
    }
}
