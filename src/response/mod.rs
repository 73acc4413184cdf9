// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use http::Response as HttpResponse;
use http::StatusCode;
use http::header::{ALLOW, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use body::Body;
use codec::MediaType;
use error::HandlerError;
use router::Method;

/// What a handler hands back: a status and an optional entity.
/// The dispatcher picks the wire format.
///
/// ```
/// extern crate rest_resource;
/// #[macro_use]
/// extern crate serde_derive;
///
/// use rest_resource::*;
///
/// #[derive(Serialize)]
/// struct Hello {
///     world: String,
/// }
///
/// # #[allow(dead_code)]
/// fn hello(_: &TypedRequest) -> Result<Reply, HandlerError> {
///     Reply::ok(&Hello { world: "Sauerland".into() })
/// }
/// # fn main() {}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Option<Value>,
}

impl Reply {
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Reply { status, body }
    }

    /// 200 with the serialized entity
    pub fn ok<T: Serialize>(entity: &T) -> Result<Reply, HandlerError> {
        Ok(Reply::ok_value(::serde_json::to_value(entity)?))
    }

    /// 201 with the serialized entity
    pub fn created<T: Serialize>(entity: &T) -> Result<Reply, HandlerError> {
        Ok(Reply::new(StatusCode::CREATED, Some(::serde_json::to_value(entity)?)))
    }

    pub fn ok_value(value: Value) -> Self {
        Reply::new(StatusCode::OK, Some(value))
    }

    /// 204 without body
    pub fn no_content() -> Self {
        Reply::new(StatusCode::NO_CONTENT, None)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_parts(self) -> (StatusCode, Option<Value>) {
        (self.status, self.body)
    }
}

/// Encoded result of one dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResponse {
    status: StatusCode,
    body: Body,
    content_type: Option<MediaType>,
    allow: Vec<Method>,
}

impl TypedResponse {
    pub fn new(status: StatusCode, body: Body, content_type: Option<MediaType>) -> Self {
        TypedResponse { status, body, content_type, allow: Vec::new() }
    }

    pub fn empty(status: StatusCode) -> Self {
        TypedResponse::new(status, Body::empty(), None)
    }

    pub fn with_allow(mut self, allow: Vec<Method>) -> Self {
        self.allow = allow;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    /// methods announced with a 405
    pub fn allow(&self) -> &[Method] {
        &self.allow
    }

    pub fn into_http(self) -> Result<HttpResponse<Body>, ::http::Error> {
        let mut builder = HttpResponse::builder();
        builder.status(self.status);
        if let Some(ref content_type) = self.content_type {
            builder.header(CONTENT_TYPE, content_type.to_string().as_str());
        }
        if !self.allow.is_empty() {
            let allow: Vec<&str> = self.allow.iter().map(|m| m.as_str()).collect();
            builder.header(ALLOW, allow.join(", ").as_str());
        }
        builder.body(self.body)
    }
}
