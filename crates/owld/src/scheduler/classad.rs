//! Reader for the plain-text ClassAd listings printed by `condor_status -long`.
//!
//! Each ad is a block of `Name = value` lines; blocks are separated by blank
//! lines. Values are typed on a best-effort basis: quoted strings, booleans,
//! integers, and floats become the matching JSON values, anything else (for
//! example an expression) is kept as its raw text.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A single parsed ClassAd.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClassAd {
    attributes: Map<String, Value>,
}

impl ClassAd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an attribute by its exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The `Name` attribute when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("Name").and_then(Value::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Converts the ad into a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.attributes)
    }
}

/// Errors raised while reading ClassAd text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassAdError {
    #[error("line {line}: expected 'name = value', got '{text}'")]
    MissingAssignment { line: usize, text: String },
    #[error("line {line}: attribute name is empty")]
    EmptyName { line: usize },
    #[error("line {line}: attribute '{name}' is defined twice")]
    Duplicate { line: usize, name: String },
}

/// Parses every ad in `text`.
///
/// # Errors
///
/// Returns the first [`ClassAdError`] encountered.
pub fn parse_classads(text: &str) -> Result<Vec<ClassAd>, ClassAdError> {
    let joined = join_continuations(text);
    let mut ads = Vec::new();
    let mut current = ClassAd::new();
    for (index, raw) in joined.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            if !current.is_empty() {
                ads.push(std::mem::take(&mut current));
            }
            continue;
        }
        parse_line(index + 1, line, &mut current)?;
    }
    if !current.is_empty() {
        ads.push(current);
    }
    Ok(ads)
}

/// Parses a single ad. Blank lines are ignored.
///
/// # Errors
///
/// Returns the first [`ClassAdError`] encountered.
pub fn parse_classad(text: &str) -> Result<ClassAd, ClassAdError> {
    let joined = join_continuations(text);
    let mut ad = ClassAd::new();
    for (index, raw) in joined.lines().enumerate() {
        let line = raw.trim();
        if !line.is_empty() {
            parse_line(index + 1, line, &mut ad)?;
        }
    }
    Ok(ad)
}

fn parse_line(number: usize, line: &str, ad: &mut ClassAd) -> Result<(), ClassAdError> {
    if line.starts_with('#') {
        return Ok(());
    }
    if line
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("queue"))
    {
        ad.insert("Instances", Value::from(queue_instances(line)));
        return Ok(());
    }

    let Some((raw_name, raw_value)) = line.split_once('=') else {
        return Err(ClassAdError::MissingAssignment {
            line: number,
            text: line.to_owned(),
        });
    };
    let name = raw_name.trim().trim_start_matches('+');
    if name.is_empty() {
        return Err(ClassAdError::EmptyName { line: number });
    }
    if ad.get(name).is_some() {
        return Err(ClassAdError::Duplicate {
            line: number,
            name: name.to_owned(),
        });
    }
    ad.insert(name, parse_value(raw_value.trim()));
    Ok(())
}

/// Types a raw attribute value.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    if let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::String(inner.to_owned());
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::from(integer);
    }
    if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(raw.to_owned())
}

fn queue_instances(line: &str) -> u64 {
    let mut tokens = line.split_whitespace().skip(1);
    match (tokens.next(), tokens.next()) {
        (Some(count), None) => count.parse().unwrap_or(1),
        _ => 1,
    }
}

fn join_continuations(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut continued = false;
    for line in text.lines() {
        let line = if continued { line.trim_start() } else { line };
        match line.trim_end().strip_suffix('\\') {
            Some(head) => {
                joined.push_str(head.trim_end());
                joined.push(' ');
                continued = true;
            }
            None => {
                joined.push_str(line);
                joined.push('\n');
                continued = false;
            }
        }
    }
    joined
}
