//! Parsing of the pipe-delimited reply produced by the Langflow flow.
//!
//! A reply looks like
//! `languages: ['Rust', 'Go']|prompt: ...|url: https://github.com/x|count: 12|animals: ...`.
//! Every field is best effort: a segment that is missing or malformed leaves
//! its field at the default and never prevents the other segments from being
//! read.

mod animals;
mod literal;

pub use animals::parse_animals;

use crate::models::ParsedProfile;
use tracing::{debug, warn};

/// Upstream field a segment maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Languages,
    Prompt,
    Url,
    Count,
    Animals,
}

impl Field {
    fn from_key(key: &str) -> Option<Field> {
        match key.trim().to_ascii_lowercase().as_str() {
            "languages" => Some(Field::Languages),
            "prompt" => Some(Field::Prompt),
            "url" | "github_url" | "github_user_name_url" => Some(Field::Url),
            "count" | "num_repositories" | "repositories" => Some(Field::Count),
            "animals" | "animal_selection" => Some(Field::Animals),
            _ => None,
        }
    }

    fn from_position(index: usize) -> Option<Field> {
        match index {
            0 => Some(Field::Languages),
            1 => Some(Field::Prompt),
            2 => Some(Field::Url),
            3 => Some(Field::Count),
            4 => Some(Field::Animals),
            _ => None,
        }
    }
}

/// Parse a Langflow reply into a [`ParsedProfile`]. Never fails.
pub fn parse_profile(text: &str) -> ParsedProfile {
    let mut profile = ParsedProfile::default();

    for (index, segment) in text.split('|').enumerate() {
        let Some((key, value)) = segment.split_once(':') else {
            if !segment.trim().is_empty() {
                debug!("Skipping segment {} without a key: {:?}", index, segment);
            }
            continue;
        };

        let Some(field) = Field::from_key(key).or_else(|| Field::from_position(index)) else {
            debug!("Ignoring unrecognized segment {}: {:?}", index, key);
            continue;
        };

        match field {
            Field::Languages => profile.languages = parse_languages(value),
            Field::Prompt => profile.prompt = value.trim().to_string(),
            Field::Url => profile.profile_url = value.trim().to_string(),
            Field::Count => profile.repository_count = parse_count(value),
            Field::Animals => profile.animal_selection = parse_animals(value),
        }
    }

    profile
}

/// Split a language list such as `['Rust', 'Go']` or `{'Rust': 60, 'Go': 40}`.
///
/// A trailing `: weight` on an entry is discarded.
pub fn parse_languages(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches(&['[', '{'][..])
        .trim_end_matches(&[']', '}'][..])
        .split(',')
        .filter_map(|entry| {
            let entry = strip_quotes(entry);
            let name = match entry.split_once(':') {
                Some((name, _weight)) => strip_quotes(name),
                None => entry,
            };
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Repository count; anything that is not a non-negative integer yields 0
pub fn parse_count(value: &str) -> u32 {
    let value = strip_quotes(value);
    match value.parse::<u32>() {
        Ok(count) => count,
        Err(e) => {
            warn!("Invalid repository count {:?}: {}", value, e);
            0
        }
    }
}

pub(crate) fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(&['\'', '"'][..]).trim()
}
