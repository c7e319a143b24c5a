//! Column-prompt resolution.
//!
//! A prompt is a comma-separated list of terms matched against an ordered
//! name list. A term is an exact name, a wildcard pattern (`*` any run, `?`
//! one character, matched against the whole name), or a `start - stop` span
//! selecting every name between two exact names inclusive. Results keep the
//! source order and drop duplicates.

use regex::Regex;

use crate::error::{FramexlError, Result};

/// Resolve `prompt` against `names`. Every term must select at least one
/// name; a dead term is UnresolvedColumn.
pub fn resolve(prompt: &str, names: &[String]) -> Result<Vec<String>> {
    let mut selected: Vec<String> = Vec::new();
    for term in prompt.split(',') {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        let matched = resolve_term(term, names)?;
        for name in matched {
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
    }
    if selected.is_empty() {
        return Err(FramexlError::UnresolvedColumn(prompt.to_string()));
    }
    Ok(selected)
}

fn resolve_term(term: &str, names: &[String]) -> Result<Vec<String>> {
    if let Some((start, stop)) = term.split_once(" - ") {
        return resolve_span(start.trim(), stop.trim(), names);
    }
    if term.contains('*') || term.contains('?') {
        let pattern = compile(term)?;
        let matched: Vec<String> = names
            .iter()
            .filter(|n| pattern.is_match(n))
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(FramexlError::UnresolvedColumn(term.to_string()));
        }
        return Ok(matched);
    }
    if names.iter().any(|n| n == term) {
        Ok(vec![term.to_string()])
    } else {
        Err(FramexlError::UnresolvedColumn(term.to_string()))
    }
}

fn resolve_span(start: &str, stop: &str, names: &[String]) -> Result<Vec<String>> {
    let a = names
        .iter()
        .position(|n| n == start)
        .ok_or_else(|| FramexlError::UnresolvedColumn(start.to_string()))?;
    let b = names
        .iter()
        .position(|n| n == stop)
        .ok_or_else(|| FramexlError::UnresolvedColumn(stop.to_string()))?;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Ok(names[lo..=hi].to_vec())
}

/// True when `value` matches the wildcard pattern as a whole string.
pub fn matches(pattern: &str, value: &str) -> Result<bool> {
    if pattern.contains('*') || pattern.contains('?') {
        Ok(compile(pattern)?.is_match(value))
    } else {
        Ok(pattern == value)
    }
}

fn compile(term: &str) -> Result<Regex> {
    let mut pattern = String::with_capacity(term.len() + 8);
    pattern.push('^');
    for ch in term.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|_| FramexlError::UnresolvedColumn(term.to_string()))
}
