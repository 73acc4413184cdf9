// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
pub const TEXT_XML: &str = "text/xml";

/// `type/subtype` with optional parameters, compared case insensitive.
/// Parameters (e.g. charset) are kept for display but ignored when matching.
#[derive(Debug, Clone, Eq)]
pub struct MediaType {
    main: String,
    sub: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    pub fn parse(value: &str) -> Option<MediaType> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let mut split = essence.splitn(2, '/');
        let main = split.next()?.trim().to_ascii_lowercase();
        let sub = split.next()?.trim().to_ascii_lowercase();
        if main.is_empty() || sub.is_empty() || !is_token(&main) || !is_token(&sub) {
            return None;
        }
        if main == "*" && sub != "*" {
            return None;
        }

        let mut params = Vec::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let mut kv = param.splitn(2, '=');
            let key = kv.next()?.trim().to_ascii_lowercase();
            let value = kv.next()?.trim().trim_matches('"').to_string();
            if key.is_empty() {
                return None;
            }
            params.push((key, value));
        }
        Some(MediaType { main, sub, params })
    }

    pub fn main_type(&self) -> &str {
        self.main.as_str()
    }

    pub fn sub_type(&self) -> &str {
        self.sub.as_str()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|p| p.0 == name).map(|p| p.1.as_str())
    }

    /// `type/subtype` without parameters
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    pub fn is_wildcard(&self) -> bool {
        self.main == "*" || self.sub == "*"
    }

    /// 0 for `*/*`, 1 for `type/*`, 2 for a concrete type
    pub fn specificity(&self) -> u8 {
        match (self.main.as_str(), self.sub.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// true if this (possibly wildcard) range covers the concrete type `other`
    pub fn matches(&self, other: &MediaType) -> bool {
        (self.main == "*" || self.main == other.main) && (self.sub == "*" || self.sub == other.sub)
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &MediaType) -> bool {
        self.main == other.main && self.sub == other.sub
    }
}

impl ::std::hash::Hash for MediaType {
    fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
        self.main.hash(state);
        self.sub.hash(state);
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)?;
        for &(ref key, ref value) in &self.params {
            write!(f, "; {}={}", key, value)?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s).ok_or(())
    }
}

fn is_token(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptRange {
    pub media_type: MediaType,
    pub quality: f32,
}

/// Parses an `Accept` header into ranges ordered by descending quality.
/// Ranges with equal quality keep their header order. Entries that do not
/// parse are dropped, `q=0` entries are kept as exclusions at the end.
pub fn parse_accept(header: &str) -> Vec<AcceptRange> {
    let mut ranges: Vec<AcceptRange> = header
        .split(',')
        .filter_map(|entry| {
            let media_type = MediaType::parse(entry)?;
            let quality = match media_type.param("q") {
                Some(q) => match q.parse::<f32>() {
                    Ok(q) if q >= 0.0 && q <= 1.0 => q,
                    _ => {
                        debug!("Ignoring accept entry with bad quality: {}", entry);
                        return None;
                    }
                },
                None => 1.0,
            };
            Some(AcceptRange { media_type, quality })
        })
        .collect();
    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    ranges
}

/// Quality the client gives `mime`, taken from the most specific range
/// covering it. `0.0` if no range covers it or it is excluded with `q=0`.
pub fn quality_of(ranges: &[AcceptRange], mime: &MediaType) -> f32 {
    let mut best: Option<&AcceptRange> = None;
    for range in ranges.iter().filter(|r| r.media_type.matches(mime)) {
        match best {
            Some(current) if current.media_type.specificity() >= range.media_type.specificity() => {}
            _ => best = Some(range),
        }
    }
    best.map(|r| r.quality).unwrap_or(0.0)
}
