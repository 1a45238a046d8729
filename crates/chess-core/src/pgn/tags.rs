//! PGN tag pairs (`[Event "..."]`).

use super::PgnError;
use std::collections::BTreeMap;
use std::fmt;

/// The Seven Tag Roster, in the order PGN requires.
pub const REQUIRED_TAGS: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// An ordered set of PGN tags.
///
/// Iteration yields the required tags first, in roster order, then every
/// other tag alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    values: BTreeMap<String, String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let required = REQUIRED_TAGS
            .iter()
            .filter_map(|name| self.values.get_key_value(*name));
        let rest = self
            .values
            .iter()
            .filter(|(name, _)| !REQUIRED_TAGS.contains(&name.as_str()));
        required
            .chain(rest)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Fills every missing roster tag with its placeholder value.
    pub fn fill_required(&mut self) {
        for name in REQUIRED_TAGS {
            if !self.values.contains_key(name) {
                self.values
                    .insert(name.to_string(), placeholder(name).to_string());
            }
        }
    }

    /// Parses the tag section at the start of `text`.
    ///
    /// Returns the tags and the remainder of the text after the tag lines.
    pub fn parse(text: &str) -> Result<(Tags, &str), PgnError> {
        let mut tags = Tags::new();
        let mut rest = text;
        loop {
            let trimmed = rest.trim_start();
            if !trimmed.starts_with('[') {
                return Ok((tags, trimmed));
            }
            let (line, remainder) = match trimmed.find('\n') {
                Some(end) => (&trimmed[..end], &trimmed[end + 1..]),
                None => (trimmed, ""),
            };
            let (name, value) = parse_tag_line(line.trim_end())?;
            tags.set(name, value);
            rest = remainder;
        }
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "[{} \"{}\"]", name, escape(value))?;
        }
        Ok(())
    }
}

fn placeholder(name: &str) -> &'static str {
    match name {
        "Date" => "????.??.??",
        "Result" => "*",
        _ => "?",
    }
}

fn parse_tag_line(line: &str) -> Result<(String, String), PgnError> {
    let malformed = || PgnError::MalformedTag(line.to_string());

    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(malformed)?
        .trim();
    let (name, quoted) = inner.split_once(char::is_whitespace).ok_or_else(malformed)?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed());
    }

    let quoted = quoted.trim();
    let body = quoted
        .strip_prefix('"')
        .and_then(|q| q.strip_suffix('"'))
        .ok_or_else(malformed)?;

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next().ok_or_else(malformed)?),
            '"' => return Err(malformed()),
            _ => value.push(c),
        }
    }
    Ok((name.to_string(), value))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
