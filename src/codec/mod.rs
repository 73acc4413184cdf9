// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Body codecs and content negotiation.
//!
//! A codec turns bytes of one or more media types into a `serde_json::Value`
//! tree and back. The registry is filled once during startup and only read
//! afterwards, so it is shared between request threads without locking.

use std::fmt;
use serde_json::Value;
use error::CodecError;

pub mod media_type;
pub mod json;
pub mod xml;

pub use self::media_type::{MediaType, AcceptRange, parse_accept, quality_of, APPLICATION_JSON, APPLICATION_XML, TEXT_XML};
pub use self::json::JsonCodec;
pub use self::xml::XmlCodec;

pub trait Codec: Send + Sync {
    /// media types handled by this codec, the first one is the canonical one
    fn media_types(&self) -> &[MediaType];

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// `root` names the encoded entity, formats without a root element ignore it
    fn encode(&self, root: &str, value: &Value) -> Result<Vec<u8>, CodecError>;
}

pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecRegistry {
    /// registry without any codec
    pub fn new() -> Self {
        CodecRegistry { codecs: Vec::new() }
    }

    /// Adds a codec. A codec sharing a media type with an already registered
    /// one takes over its slot, so the registration order stays stable.
    pub fn register<C: Codec + 'static>(&mut self, codec: C) {
        let overlaps = |existing: &Box<dyn Codec>| existing.media_types().iter().any(|m| codec.media_types().contains(m));
        let position = self.codecs.iter().position(|c| overlaps(c));
        match position {
            Some(index) => {
                debug!("Replacing codec for {:?}", codec.media_types());
                self.codecs[index] = Box::new(codec);
                let mut i = index + 1;
                while i < self.codecs.len() {
                    let shared = self.codecs[i].media_types().iter().any(|m| self.codecs[index].media_types().contains(m));
                    if shared {
                        self.codecs.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.codecs.push(Box::new(codec)),
        }
    }

    /// all registered media types in registration order
    pub fn media_types(&self) -> Vec<MediaType> {
        self.codecs.iter().flat_map(|c| c.media_types().iter().cloned()).collect()
    }

    fn find(&self, mime: &MediaType) -> Option<&dyn Codec> {
        if mime.is_wildcard() {
            return None;
        }
        self.codecs.iter().find(|c| c.media_types().contains(mime)).map(|c| &**c)
    }

    pub fn decoder_for(&self, mime: &MediaType) -> Result<&dyn Codec, CodecError> {
        self.find(mime).ok_or_else(|| CodecError::Unsupported(mime.essence()))
    }

    pub fn encoder_for(&self, mime: &MediaType) -> Result<&dyn Codec, CodecError> {
        self.find(mime).ok_or_else(|| CodecError::Unsupported(mime.essence()))
    }

    /// Picks the response media type.
    ///
    /// Accept ranges are walked in priority order, the first produced type a
    /// range covers and that has an encoder wins. Types the most specific
    /// covering range excludes with `q=0` are never picked. Without an `Accept` header
    /// the first encodable produced type is used. An empty `produces` list
    /// stands for every registered type.
    pub fn negotiate(&self, accept: Option<&str>, produces: &[MediaType]) -> Result<(MediaType, &dyn Codec), CodecError> {
        let registered;
        let candidates = if produces.is_empty() {
            registered = self.media_types();
            registered.as_slice()
        } else {
            produces
        };

        let accept = accept.map(|a| a.trim()).filter(|a| !a.is_empty());
        match accept {
            None => {
                for candidate in candidates {
                    if let Some(codec) = self.find(candidate) {
                        return Ok((candidate.clone(), codec));
                    }
                }
            }
            Some(header) => {
                let ranges = parse_accept(header);
                for range in ranges.iter().filter(|r| r.quality > 0.0) {
                    for candidate in candidates {
                        if !range.media_type.matches(candidate) || quality_of(&ranges, candidate) <= 0.0 {
                            continue;
                        }
                        if let Some(codec) = self.find(candidate) {
                            return Ok((candidate.clone(), codec));
                        }
                    }
                }
            }
        }
        Err(CodecError::NotAcceptable(accept.unwrap_or("").to_string()))
    }
}

/// json first, then xml
impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry::new();
        registry.register(JsonCodec::new());
        registry.register(XmlCodec::new());
        registry
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let types: Vec<String> = self.media_types().iter().map(|m| m.essence()).collect();
        write!(f, "CodecRegistry({})", types.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral::prelude::*;

    fn mime(s: &str) -> MediaType {
        MediaType::parse(s).unwrap()
    }

    struct ShoutingJson {
        types: Vec<MediaType>,
    }

    impl Codec for ShoutingJson {
        fn media_types(&self) -> &[MediaType] {
            &self.types
        }

        fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
            JsonCodec::new().decode(bytes)
        }

        fn encode(&self, root: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
            let bytes = JsonCodec::new().encode(root, value)?;
            Ok(String::from_utf8_lossy(&bytes).to_uppercase().into_bytes())
        }
    }

    #[test]
    fn lookup_by_media_type() {
        let registry = CodecRegistry::default();
        assert_that(&registry.decoder_for(&mime("application/json; charset=utf-8")).is_ok()).is_true();
        assert_that(&registry.encoder_for(&mime(TEXT_XML)).is_ok()).is_true();
        assert_that(&registry.decoder_for(&mime("application/unsupported-type")).err())
            .is_equal_to(Some(CodecError::Unsupported("application/unsupported-type".into())));
        assert_that(&registry.decoder_for(&mime("*/*")).is_err()).is_true();
    }

    #[test]
    fn register_replaces_same_media_type() {
        let mut registry = CodecRegistry::default();
        registry.register(ShoutingJson { types: vec![mime(APPLICATION_JSON)] });

        let types: Vec<String> = registry.media_types().iter().map(|m| m.essence()).collect();
        assert_eq!(vec!["application/json", "application/xml", "text/xml"], types);

        let codec = registry.encoder_for(&mime(APPLICATION_JSON)).unwrap();
        let bytes = codec.encode("User", &json!({"id": "a"})).unwrap();
        assert_eq!(r#"{"ID":"A"}"#, String::from_utf8(bytes).unwrap());
    }

    #[test]
    fn negotiate_without_accept_takes_first_produced() {
        let registry = CodecRegistry::default();
        let produces = vec![mime(APPLICATION_XML), mime(APPLICATION_JSON)];
        let (chosen, _) = registry.negotiate(None, &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);

        let (chosen, _) = registry.negotiate(Some("  "), &[]).unwrap();
        assert_eq!(mime(APPLICATION_JSON), chosen);
    }

    #[test]
    fn negotiate_honours_accept_priority() {
        let registry = CodecRegistry::default();
        let produces = vec![mime(APPLICATION_JSON), mime(APPLICATION_XML)];

        let (chosen, _) = registry.negotiate(Some("application/xml"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);

        let (chosen, _) = registry.negotiate(Some("application/json;q=0.5, application/xml"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);

        let (chosen, _) = registry.negotiate(Some("text/html, */*;q=0.1"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_JSON), chosen);
    }

    #[test]
    fn negotiate_respects_exclusions() {
        let registry = CodecRegistry::default();
        let produces = vec![mime(APPLICATION_JSON), mime(APPLICATION_XML)];

        let (chosen, _) = registry.negotiate(Some("application/json;q=0, */*"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);

        let (chosen, _) = registry.negotiate(Some("*/*;q=0, application/xml"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);

        let result = registry.negotiate(Some("application/*;q=0, */*"), &produces);
        assert_that(&result.is_err()).is_true();
    }

    #[test]
    fn negotiate_skips_types_without_encoder() {
        let mut registry = CodecRegistry::new();
        registry.register(XmlCodec::new());
        let produces = vec![mime(APPLICATION_JSON), mime(APPLICATION_XML)];

        let (chosen, _) = registry.negotiate(Some("*/*"), &produces).unwrap();
        assert_eq!(mime(APPLICATION_XML), chosen);
    }

    #[test]
    fn negotiate_fails_without_intersection() {
        let registry = CodecRegistry::default();
        let produces = vec![mime(APPLICATION_JSON)];
        let result = registry.negotiate(Some("text/html, application/xml"), &produces);
        match result {
            Err(CodecError::NotAcceptable(accept)) => assert_eq!("text/html, application/xml", accept),
            Err(other) => panic!("unexpected error {}", other),
            Ok((chosen, _)) => panic!("unexpected success {}", chosen),
        }
    }
}
