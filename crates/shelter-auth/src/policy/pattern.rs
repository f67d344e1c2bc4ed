//! Route path patterns.

use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}` or `*`: exactly one segment.
    Any,
    /// Trailing `**`: zero or more segments.
    Rest,
}

/// A `/`-separated path pattern.
///
/// Segments are literals, `{name}` or `*` (one segment), or a trailing `**`
/// (any number of segments, including none). Empty segments are ignored,
/// so `/a/b/` and `/a/b` are the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

/// How specific a pattern is. Larger is more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    exact_length: bool,
    literals: usize,
    segments: usize,
}

impl PathPattern {
    /// Parses a pattern. `**` is only accepted as the last segment.
    pub fn parse(pattern: &str) -> Result<Self, AuthError> {
        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (i, seg) in raw.iter().enumerate() {
            let segment = match *seg {
                "**" if i + 1 == raw.len() => Segment::Rest,
                "**" => {
                    return Err(AuthError::Validation(format!(
                        "'**' must be the last segment in '{pattern}'"
                    )));
                }
                "*" => Segment::Any,
                s if s.starts_with('{') && s.ends_with('}') && s.len() > 2 => Segment::Any,
                s if s.contains(['{', '}', '*']) => {
                    return Err(AuthError::Validation(format!(
                        "Unsupported segment '{s}' in '{pattern}'"
                    )));
                }
                s => Segment::Literal(s.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Whether `path` (without query string) matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => {
                    if parts.next() != Some(lit.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.next().is_none()
    }

    /// Ranking used to pick the best of several matching patterns.
    pub fn specificity(&self) -> Specificity {
        Specificity {
            exact_length: !self.segments.contains(&Segment::Rest),
            literals: self
                .segments
                .iter()
                .filter(|s| matches!(s, Segment::Literal(_)))
                .count(),
            segments: self.segments.len(),
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for PathPattern {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
