// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;
use serde_json::Value;
use codec::MediaType;
use error::HandlerError;
use router::Method;

mod params;
pub mod binder;

pub use self::params::Params;
pub use self::binder::{Binder, RawRequest};

/// A matched and bound request as seen by a handler.
///
/// Created per call by the binder, never shared between calls.
#[derive(Debug, Clone)]
pub struct TypedRequest {
    method: Method,
    path: String,
    params: Params,
    query: HashMap<String, Vec<String>>,
    body: Option<Value>,
    content_type: Option<MediaType>,
}

impl TypedRequest {
    /// request without parameters or body, handy for calling handlers directly
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        TypedRequest {
            method,
            path: path.into(),
            params: Params::new(),
            query: HashMap::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = TypedRequest::parse_query(Some(query));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// path parameter converted with `FromStr`, a failure is a bad request
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, HandlerError> {
        let value = self.param(name).ok_or_else(|| HandlerError::bad_request(format!("missing parameter '{}'", name)))?;
        value.parse().map_err(|_| HandlerError::bad_request(format!("parameter '{}' has an unexpected format", name)))
    }

    pub fn query_first(&self, name: &str) -> Option<&str> {
        self.query(name).and_then(|values| values.first()).map(|v| v.as_str())
    }

    pub fn query(&self, name: &str) -> Option<&Vec<String>> {
        self.query.get(name)
    }

    pub fn query_all(&self) -> &HashMap<String, Vec<String>> {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    /// Deserializes the decoded body into the handler's entity type.
    pub fn entity<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        match self.body {
            Some(ref value) => ::serde_json::from_value(value.clone()).map_err(|e| {
                debug!("Body does not match the expected entity: {}", e);
                HandlerError::bad_request("body does not match the expected entity")
            }),
            None => Err(HandlerError::bad_request("no body given")),
        }
    }

    fn parse_query(query: Option<&str>) -> HashMap<String, Vec<String>> {
        match query {
            Some(query) => {
                let mut map: HashMap<String, Vec<String>> = HashMap::new();
                for (key, value) in ::url::form_urlencoded::parse(query.as_bytes()) {
                    map.entry(key.into_owned()).or_insert_with(Vec::new).push(value.into_owned());
                }
                map
            }
            None => HashMap::with_capacity(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Hello {
        world: String,
    }

    #[test]
    fn test_query_param() {
        let req = TypedRequest::new(Method::Get, "/bla").with_query("hallo=welt&hallo=blubb&x=a%20b");
        assert_eq!("welt", req.query_first("hallo").unwrap());
        assert_eq!(None, req.query_first("ne"));
        assert_eq!(2, req.query("hallo").unwrap().len());
        assert_eq!(Some("a b"), req.query_first("x"));
    }

    #[test]
    fn typed_param_access() {
        let req = TypedRequest::new(Method::Get, "/items/12").with_param("id", "12").with_param("name", "x");
        assert_eq!(12u32, req.param_as::<u32>("id").unwrap());
        assert!(req.param_as::<u32>("name").is_err());
        assert!(req.param_as::<u32>("missing").is_err());
    }

    #[test]
    fn entity_from_body() {
        let req = TypedRequest::new(Method::Post, "/").with_body(json!({"world": "Sauerland"}));
        assert_eq!(Hello { world: "Sauerland".into() }, req.entity::<Hello>().unwrap());

        let req = TypedRequest::new(Method::Post, "/").with_body(json!({"other": 1}));
        match req.entity::<Hello>() {
            Err(HandlerError::BadRequest(msg)) => assert_eq!("body does not match the expected entity", msg),
            other => panic!("expected bad request, got {:?}", other),
        }
        assert!(TypedRequest::new(Method::Post, "/").entity::<Hello>().is_err());
    }
}
