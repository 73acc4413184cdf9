// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Request processing from raw method, path, headers and body to an encoded
//! response.
//!
//! Each call runs through the same checks and stops at the first failure:
//!
//! 1. body size limit (413)
//! 2. route match (404, or 405 with an `Allow` header)
//! 3. content type of a present body against the route's consumes types (415)
//! 4. parameter and body binding (400)
//! 5. response negotiation for routes writing an entity (406), before the
//!    handler runs so that a rejected request has no side effects
//! 6. handler invocation, handler errors map to 404/400/500
//! 7. encoding of the reply body with the negotiated codec
//!
//! Failures are written as `{kind, message}` in a format the client accepts.
//! Internal error details are only logged.

use std::sync::Arc;
use http::Method as HttpMethod;
use http::header::{HeaderMap, HeaderName, ACCEPT, CONTENT_TYPE};
use body::Body;
use codec::{CodecRegistry, MediaType};
use docs::ApiDescription;
use error::HttpError;
use request::{Binder, RawRequest};
use response::TypedResponse;
use router::{Method, Resolution, Route, RouteMatch, RouteTable};
use router::matcher::allowed_methods;

pub mod tester;

use self::tester::ServerTester;

/// root element used for entities of routes that do not name what they write
const DEFAULT_ROOT: &str = "Entity";
const ERROR_ROOT: &str = "Error";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// larger bodies are rejected with 413 before routing
    pub max_body_size: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig { max_body_size: 20_000_000 }
    }
}

/// Stateless request processor over a read-only route table and codec registry.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RouteTable,
    codecs: CodecRegistry,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, codecs: CodecRegistry) -> Self {
        Dispatcher::with_config(routes, codecs, DispatcherConfig::default())
    }

    pub fn with_config(routes: RouteTable, codecs: CodecRegistry, config: DispatcherConfig) -> Self {
        Dispatcher { routes, codecs, config }
    }

    pub fn set_config(&mut self, config: DispatcherConfig) {
        self.config = config;
    }

    pub fn config(&self) -> DispatcherConfig {
        self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn describe(&self) -> ApiDescription {
        self.routes.describe()
    }

    pub fn start_testing(self) -> ServerTester {
        ServerTester::new(Arc::new(self))
    }

    /// Processes one call. `path` may carry a query string.
    pub fn handle(&self, method: &HttpMethod, path: &str, headers: &HeaderMap, body: &Body) -> TypedResponse {
        debug!("Got request {} {}", method, path);
        match self.dispatch(method, path, headers, body) {
            Ok(response) => {
                trace!("Successfully handled request. Response: {:?}", &response);
                response
            }
            Err(err) => {
                warn!("Failed to handle {} {}: {}", method, path, err);
                self.error_response(&err, header_str(headers, ACCEPT))
            }
        }
    }

    fn dispatch(&self, method: &HttpMethod, path: &str, headers: &HeaderMap, body: &Body) -> Result<TypedResponse, HttpError> {
        if body.len() > self.config.max_body_size {
            return Err(HttpError::payload_too_large(body.len(), self.config.max_body_size));
        }

        let (path, query) = split_query(path);
        let RouteMatch { route, params } = self.find_route(method, path)?;
        let content_type = self.check_content_type(route, headers, body)?;

        let raw = RawRequest { path, params, query, body, content_type: content_type.as_ref() };
        let request = Binder::new(&self.codecs).bind(route, raw)?;

        let negotiated = self.codecs.negotiate(header_str(headers, ACCEPT), route.produces());
        if let Err(ref err) = negotiated {
            if route.writes().is_some() {
                return Err(err.clone().into());
            }
        }

        let reply = route.handler().handle(&request)?;
        let (status, value) = reply.into_parts();
        match value {
            None => Ok(TypedResponse::empty(status)),
            Some(value) => {
                let (mime, codec) = negotiated?;
                let bytes = codec.encode(route.writes().unwrap_or(DEFAULT_ROOT), &value)?;
                Ok(TypedResponse::new(status, Body::from(bytes), Some(mime)))
            }
        }
    }

    fn find_route(&self, method: &HttpMethod, path: &str) -> Result<RouteMatch, HttpError> {
        match Method::from_http(method) {
            Some(method) => match self.routes.resolve(method, path) {
                Resolution::Found(found) => Ok(found),
                Resolution::MethodNotAllowed(allow) => Err(HttpError::method_not_allowed(method.as_str(), allow)),
                Resolution::NoMatch => Err(HttpError::no_match(path)),
            },
            None => {
                let allow = allowed_methods(&self.routes, path);
                if allow.is_empty() {
                    Err(HttpError::no_match(path))
                } else {
                    Err(HttpError::method_not_allowed(method.as_str(), allow))
                }
            }
        }
    }

    /// content type of the request, validated only when a body is present
    fn check_content_type(&self, route: &Route, headers: &HeaderMap, body: &Body) -> Result<Option<MediaType>, HttpError> {
        let header = header_str(headers, CONTENT_TYPE);
        if body.is_empty() {
            return Ok(header.and_then(MediaType::parse));
        }

        let header = header.ok_or_else(|| HttpError::unsupported_media_type("request body without content type"))?;
        let content_type = MediaType::parse(header).ok_or_else(|| HttpError::unsupported_media_type(format!("invalid content type '{}'", header)))?;

        let accepted = if route.consumes().is_empty() {
            self.codecs.media_types().iter().any(|m| m.matches(&content_type))
        } else {
            route.consumes().iter().any(|m| m.matches(&content_type))
        };
        if !accepted {
            return Err(HttpError::unsupported_media_type(format!("content type {} is not consumed by this route", content_type.essence())));
        }
        self.codecs.decoder_for(&content_type)?;
        Ok(Some(content_type))
    }

    fn error_response(&self, err: &HttpError, accept: Option<&str>) -> TypedResponse {
        let status = err.status();
        let value = match ::serde_json::to_value(err.to_body()) {
            Ok(value) => value,
            Err(e) => {
                error!("Could not serialize error body: {}", e);
                return TypedResponse::empty(status).with_allow(err.allow().to_vec());
            }
        };

        let negotiated = self.codecs.negotiate(accept, &[]).or_else(|_| self.codecs.negotiate(None, &[]));
        let response = match negotiated {
            Ok((mime, codec)) => match codec.encode(ERROR_ROOT, &value) {
                Ok(bytes) => TypedResponse::new(status, Body::from(bytes), Some(mime)),
                Err(e) => {
                    error!("Could not encode error body: {}", e);
                    TypedResponse::empty(status)
                }
            },
            Err(_) => TypedResponse::empty(status),
        };
        response.with_allow(err.allow().to_vec())
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.find('?') {
        Some(index) => (&path[..index], Some(&path[index + 1..])),
        None => (path, None),
    }
}
