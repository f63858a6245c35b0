use super::literal::{parse_literal, Literal};
use super::strip_quotes;
use crate::models::AnimalChoice;
use tracing::{debug, warn};

/// Separators between name and description in the line layout, em dash first
const LINE_SEPARATORS: [&str; 3] = ["\u{2014}", "\u{2013}", " - "];

/// Parse the animal selection in either of its upstream layouts.
///
/// Accepts a Python literal such as `[['Cat', 'curious'], ('Dog', 'loyal')]`
/// or one `name — description` pair per line.
pub fn parse_animals(value: &str) -> Vec<AnimalChoice> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }

    if value.starts_with('[') || value.starts_with('(') {
        match parse_literal(value) {
            Ok(literal) => from_literal(literal),
            Err(e) => {
                warn!("Animal selection is not a valid literal ({}), falling back to lenient parsing", e);
                lenient_pairs(value)
            }
        }
    } else {
        parse_lines(value)
    }
}

fn from_literal(literal: Literal) -> Vec<AnimalChoice> {
    let Literal::Seq(entries) = literal else {
        debug!("Animal selection literal is not a sequence");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Literal::Seq(pair) if pair.len() == 2 => {
                let name = pair[0].as_text()?;
                let description = pair[1].as_text()?;
                Some(AnimalChoice::new(name.trim(), description.trim()))
            }
            other => {
                debug!("Skipping animal entry that is not a pair: {:?}", other);
                None
            }
        })
        .collect()
}

/// Best-effort recovery for bracketed text that is not a valid literal,
/// e.g. `[[Cat, a cute cat], [Dog, a loyal dog]]` or `[Cat, desc, Dog, desc2]`.
fn lenient_pairs(value: &str) -> Vec<AnimalChoice> {
    let inner = value.strip_prefix('[').unwrap_or(value);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let groups = bracket_groups(inner);
    if !groups.is_empty() {
        return groups
            .into_iter()
            .filter_map(|group| {
                let (name, description) = group.split_once(',')?;
                make_choice(name, description)
            })
            .collect();
    }

    let items: Vec<&str> = inner
        .split(',')
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .collect();
    items
        .chunks_exact(2)
        .filter_map(|pair| make_choice(pair[0], pair[1]))
        .collect()
}

/// Contents of every `[...]` or `(...)` group, without nesting
fn bracket_groups(s: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find(&['[', '('][..]) {
        let close_char = if rest[open..].starts_with('[') { ']' } else { ')' };
        let body = &rest[open + 1..];
        let Some(close) = body.find(close_char) else {
            break;
        };
        groups.push(&body[..close]);
        rest = &body[close + 1..];
    }
    groups
}

fn parse_lines(value: &str) -> Vec<AnimalChoice> {
    value
        .lines()
        .filter_map(|line| {
            let line = strip_bullet(line.trim());
            let (name, description) = split_on_separator(line)?;
            make_choice(name, description)
        })
        .collect()
}

/// Split at the earliest separator on the line
fn split_on_separator(line: &str) -> Option<(&str, &str)> {
    LINE_SEPARATORS
        .iter()
        .filter_map(|sep| line.find(sep).map(|index| (index, sep.len())))
        .min_by_key(|(index, _)| *index)
        .map(|(index, len)| (&line[..index], &line[index + len..]))
}

fn strip_bullet(line: &str) -> &str {
    for bullet in ["- ", "* ", "\u{2022} "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}

fn clean_item(item: &str) -> &str {
    strip_quotes(item.trim().trim_matches(&['[', ']', '(', ')'][..]))
}

fn make_choice(name: &str, description: &str) -> Option<AnimalChoice> {
    let name = clean_item(name);
    if name.is_empty() {
        return None;
    }
    Some(AnimalChoice::new(name, clean_item(description)))
}
