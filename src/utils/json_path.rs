//! Segment-by-segment access into JSON values.
//!
//! A path is a list of object keys and array indexes, displayed in dot/bracket
//! form (e.g. `outputs[0].outputs[0].results.message.text`).
//!
//! Unlike a plain `Option` lookup, [`JsonPath::resolve`] reports which segment
//! failed and why, so callers can surface a precise message.

use serde_json::Value;
use std::fmt;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Path lookup error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// `segment` does not exist under `parent` ("$" for the root).
    #[error("missing '{segment}' under '{parent}'")]
    Missing { segment: String, parent: String },

    /// The value at `parent` is not the container `segment` needs.
    #[error("expected {expected} at '{parent}' to read '{segment}', found {found}")]
    WrongShape {
        segment: String,
        parent: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    /// The segment that could not be read.
    pub fn segment(&self) -> &str {
        match self {
            PathError::Missing { segment, .. } | PathError::WrongShape { segment, .. } => segment,
        }
    }
}

/// Path such as `outputs[0].outputs[0].results.message.text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk `root`, failing on the first segment that cannot be followed.
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value, PathError> {
        let mut current = root;
        let mut walked = String::from("$");

        for segment in &self.segments {
            let next = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(i), Value::Array(arr)) => arr.get(*i),
                (Segment::Key(_), other) => {
                    return Err(PathError::WrongShape {
                        segment: segment.to_string(),
                        parent: walked,
                        expected: "object",
                        found: kind_of(other),
                    })
                }
                (Segment::Index(_), other) => {
                    return Err(PathError::WrongShape {
                        segment: segment.to_string(),
                        parent: walked,
                        expected: "array",
                        found: kind_of(other),
                    })
                }
            };

            current = next.ok_or_else(|| PathError::Missing {
                segment: segment.to_string(),
                parent: walked.clone(),
            })?;

            match segment {
                Segment::Key(k) if walked == "$" => walked = k.clone(),
                Segment::Key(k) => {
                    walked.push('.');
                    walked.push_str(k);
                }
                Segment::Index(i) => walked.push_str(&format!("[{}]", i)),
            }
        }

        Ok(current)
    }

    /// Like [`resolve`](Self::resolve) but the target must be a string.
    pub fn resolve_str<'a>(&self, root: &'a Value) -> Result<&'a str, PathError> {
        let value = self.resolve(root)?;
        value.as_str().ok_or_else(|| PathError::WrongShape {
            segment: self
                .segments
                .last()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            parent: self.to_string(),
            expected: "string",
            found: kind_of(value),
        })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i > 0 => write!(f, ".{}", k)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
