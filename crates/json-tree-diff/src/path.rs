//! Path syntax for diff records: `root['key'][0]`.
//!
//! A path names one location in a tree as a sequence of bracketed steps after
//! the `root` prefix: `[n]` for a sequence index, `['key']` for a mapping key
//! (with `\'` and `\\` escapes inside the quotes). Only this module formats
//! and parses the syntax; everything downstream of the differ treats path
//! strings as opaque keys.

use thiserror::Error;

/// One step in a path: a mapping key or a sequence index.
///
/// The derived ordering (keys before indices, indices numeric) makes sorted
/// paths group siblings by position, which the delta applier relies on when
/// ordering item insertions and removals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// A parsed path, root first.
pub type Path = Vec<PathStep>;

#[derive(Debug, Error, PartialEq)]
#[error("INVALID_PATH: {0}")]
pub struct InvalidPath(pub String);

/// Render `steps` as a path string.
pub fn format_path(steps: &[PathStep]) -> String {
    let mut out = String::from("root");
    for step in steps {
        match step {
            PathStep::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathStep::Key(key) => {
                out.push_str("['");
                for c in key.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        _ => out.push(c),
                    }
                }
                out.push_str("']");
            }
        }
    }
    out
}

/// Parse a path string back into steps.
pub fn parse_path(s: &str) -> Result<Path, InvalidPath> {
    let invalid = || InvalidPath(s.to_string());
    let rest = s.strip_prefix("root").ok_or_else(invalid)?;
    let mut steps = Path::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '[' {
            return Err(invalid());
        }
        if chars.peek() == Some(&'\'') {
            chars.next();
            let mut key = String::new();
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(escaped) => key.push(escaped),
                        None => return Err(invalid()),
                    },
                    Some('\'') => break,
                    Some(other) => key.push(other),
                    None => return Err(invalid()),
                }
            }
            if chars.next() != Some(']') {
                return Err(invalid());
            }
            steps.push(PathStep::Key(key));
        } else {
            let mut digits = String::new();
            loop {
                match chars.next() {
                    Some(']') => break,
                    Some(d) if d.is_ascii_digit() => digits.push(d),
                    _ => return Err(invalid()),
                }
            }
            let index: usize = digits.parse().map_err(|_| invalid())?;
            steps.push(PathStep::Index(index));
        }
    }
    Ok(steps)
}

// ── Tests ─────────────────────────────────────────────────────────────────
