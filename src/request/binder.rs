// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turns a matched request into a `TypedRequest`.
//!
//! Declared path parameters must be present and non-empty, declared types
//! must convert, and a declared body is decoded with the codec registered for
//! the request content type. Values are not coerced: path and query values
//! stay strings, the body stays the codec's value tree.

use body::Body;
use codec::{CodecRegistry, MediaType};
use error::{BindError, CodecError};
use router::{ParamLocation, ParamSpec, Route};
use super::{Params, TypedRequest};

/// Raw parts of a request after routing.
#[derive(Debug)]
pub struct RawRequest<'r> {
    pub path: &'r str,
    pub params: Params,
    pub query: Option<&'r str>,
    pub body: &'r Body,
    pub content_type: Option<&'r MediaType>,
}

pub struct Binder<'c> {
    codecs: &'c CodecRegistry,
}

impl<'c> Binder<'c> {
    pub fn new(codecs: &'c CodecRegistry) -> Self {
        Binder { codecs }
    }

    pub fn bind(&self, route: &Route, raw: RawRequest) -> Result<TypedRequest, BindError> {
        let RawRequest { path, params, query, body, content_type } = raw;

        for spec in route.params_in(ParamLocation::Path) {
            match params.get(&spec.name) {
                Some(value) if !value.is_empty() => check_type(spec, value)?,
                _ => return Err(BindError::MissingParameter(spec.name.clone())),
            }
        }

        let query = TypedRequest::parse_query(query);
        for spec in route.params_in(ParamLocation::Query) {
            match query.get(&spec.name) {
                Some(values) if !values.is_empty() => {
                    for value in values {
                        check_type(spec, value)?;
                    }
                }
                _ if spec.required => return Err(BindError::MissingParameter(spec.name.clone())),
                _ => {}
            }
        }

        let decoded = match route.body_param() {
            Some(spec) => self.decode_body(spec, body, content_type)?,
            None => None,
        };

        Ok(TypedRequest {
            method: route.method(),
            path: path.to_string(),
            params,
            query,
            body: decoded,
            content_type: content_type.cloned(),
        })
    }

    fn decode_body(&self, spec: &ParamSpec, body: &Body, content_type: Option<&MediaType>) -> Result<Option<::serde_json::Value>, BindError> {
        if body.is_empty() {
            return if spec.required { Err(BindError::MissingParameter(spec.name.clone())) } else { Ok(None) };
        }
        let content_type = content_type.ok_or_else(|| CodecError::Unsupported("request without content type".into()))?;
        let codec = self.codecs.decoder_for(content_type)?;
        let value = codec.decode(body.as_slice()).map_err(|e| {
            debug!("Could not decode {} body: {}", content_type.essence(), e);
            CodecError::decode(format!("body is not valid {}", content_type.essence()))
        })?;
        spec.check_entity(&value).map_err(|e| {
            debug!("Body does not match entity {}: {}", spec.name, e);
            CodecError::decode(format!("body is not a valid {}", spec.name))
        })?;
        Ok(Some(value))
    }
}

fn check_type(spec: &ParamSpec, value: &str) -> Result<(), BindError> {
    if spec.data_type.accepts(value) {
        Ok(())
    } else {
        Err(BindError::TypeConversion { name: spec.name.clone(), expected: spec.data_type.clone(), value: value.to_string() })
    }
}
