// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use url::percent_encoding::{percent_decode, utf8_percent_encode, PATH_SEGMENT_ENCODE_SET};
use error::RouteError;
use request::Params;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed route path, e.g. `/users/{user-id}` or `/users/:id`.
///
/// There is no way to modify the segments after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern { pattern: pattern.to_string(), reason: reason.to_string() };

        let trimmed = trim_slashes(pattern);
        let mut segments = Vec::new();
        if trimmed.is_empty() {
            return Ok(PathPattern { segments });
        }
        for raw in trimmed.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = if raw.starts_with('{') && raw.ends_with('}') && raw.len() > 1 {
                Segment::Param(raw[1..raw.len() - 1].to_string())
            } else if raw.starts_with(':') {
                Segment::Param(raw[1..].to_string())
            } else {
                Segment::Literal(raw.to_string())
            };
            match segment {
                Segment::Param(ref name) => {
                    if name.is_empty() || name.contains(|c: char| c == '{' || c == '}' || c == ':') {
                        return Err(invalid("bad parameter name"));
                    }
                    let duplicate = segments.iter().any(|s| match *s {
                        Segment::Param(ref other) => other == name,
                        Segment::Literal(_) => false,
                    });
                    if duplicate {
                        return Err(invalid("duplicate parameter name"));
                    }
                }
                Segment::Literal(ref text) => {
                    if text.contains(|c: char| c == '{' || c == '}') {
                        return Err(invalid("parameters must span a whole segment"));
                    }
                }
            }
            segments.push(segment);
        }
        Ok(PathPattern { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match *s {
                Segment::Param(ref name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// same literals and parameters at the same positions, parameter names aside
    pub fn same_shape(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(other.segments.iter()).all(|pair| match pair {
                (&Segment::Literal(ref a), &Segment::Literal(ref b)) => a == b,
                (&Segment::Param(_), &Segment::Param(_)) => true,
                _ => false,
            })
    }

    /// Matches already split request segments, binding parameter values.
    /// Literals compare case sensitive, parameters need a non-empty segment.
    pub fn matches<S: AsRef<str>>(&self, segments: &[S]) -> Option<Params> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(segments.iter()) {
            let actual = actual.as_ref();
            match *pattern {
                Segment::Literal(ref literal) => {
                    if literal != actual {
                        return None;
                    }
                }
                Segment::Param(ref name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }
        Some(params)
    }

    /// Renders a concrete path. `None` if a parameter has no non-empty value.
    pub fn instantiate(&self, params: &Params) -> Option<String> {
        if self.segments.is_empty() {
            return Some("/".to_string());
        }
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match *segment {
                Segment::Literal(ref literal) => path.push_str(literal),
                Segment::Param(ref name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    path.extend(utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET));
                }
            }
        }
        Some(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            match *segment {
                Segment::Literal(ref literal) => write!(f, "/{}", literal)?,
                Segment::Param(ref name) => write!(f, "/{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

fn trim_slashes(path: &str) -> &str {
    let path = if path.starts_with('/') { &path[1..] } else { path };
    if path.ends_with('/') { &path[..path.len() - 1] } else { path }
}

/// Splits a request path into percent decoded segments.
/// One leading and one trailing slash are ignored, `/` has no segments.
pub fn split_path(path: &str) -> Vec<String> {
    let trimmed = trim_slashes(path);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('/')
        .map(|raw| match percent_decode(raw.as_bytes()).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
        .collect()
}
