// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Route declarations and the route table.
//!
//! Routes are assembled from a plain `RouteConfig` and validated once when
//! they are built. After startup the table is only read, so it can be shared
//! between threads as it is.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Serializer};
use serde::de::DeserializeOwned;
use serde_json::Value;
use codec::MediaType;
use docs::ApiDescription;
use error::RouteError;
use handler::Handler;

pub mod pattern;
pub mod matcher;
pub mod service;

pub use self::pattern::{PathPattern, Segment, split_path};
pub use self::matcher::{Resolution, RouteMatch};
pub use self::service::WebService;

/// The http methods a route can be registered for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// `None` for methods no route can be registered for, e.g. TRACE
    pub fn from_http(method: &::http::Method) -> Option<Method> {
        method.as_str().parse().ok()
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter. Path and query values stay strings, but
/// `Integer` and `Boolean` values are checked while binding.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum DataType {
    String,
    Integer,
    Boolean,
    /// named body entity, e.g. `User`
    Entity(String),
}

impl DataType {
    pub fn accepts(&self, value: &str) -> bool {
        match *self {
            DataType::Integer => value.parse::<i64>().is_ok(),
            DataType::Boolean => value == "true" || value == "false",
            DataType::String | DataType::Entity(_) => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DataType::String => f.write_str("string"),
            DataType::Integer => f.write_str("integer"),
            DataType::Boolean => f.write_str("boolean"),
            DataType::Entity(ref name) => f.write_str(name),
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

type EntityCheck = fn(&Value) -> Result<(), String>;

fn check_entity<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    ::serde_json::from_value::<T>(value.clone()).map(|_| ()).map_err(|e| e.to_string())
}

/// Declaration of one route parameter.
#[derive(Clone)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub data_type: DataType,
    pub description: String,
    pub required: bool,
    entity_check: Option<EntityCheck>,
}

impl ParamSpec {
    /// required string path parameter
    pub fn path<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        ParamSpec {
            name: name.into(),
            location: ParamLocation::Path,
            data_type: DataType::String,
            description: description.into(),
            required: true,
            entity_check: None,
        }
    }

    /// optional string query parameter
    pub fn query<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        ParamSpec {
            name: name.into(),
            location: ParamLocation::Query,
            data_type: DataType::String,
            description: description.into(),
            required: false,
            entity_check: None,
        }
    }

    /// Required body of entity `T`. A decoded body that does not deserialize
    /// into `T` is rejected while binding.
    pub fn body<T: DeserializeOwned, N: Into<String>, D: Into<String>>(entity: N, description: D) -> Self {
        let mut spec = ParamSpec::body_value(entity, description);
        spec.entity_check = Some(check_entity::<T>);
        spec
    }

    /// required body accepted in any shape
    pub fn body_value<N: Into<String>, D: Into<String>>(entity: N, description: D) -> Self {
        let entity = entity.into();
        ParamSpec {
            name: entity.clone(),
            location: ParamLocation::Body,
            data_type: DataType::Entity(entity),
            description: description.into(),
            required: true,
            entity_check: None,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn check_entity(&self, value: &Value) -> Result<(), String> {
        match self.entity_check {
            Some(check) => check(value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("data_type", &self.data_type)
            .field("required", &self.required)
            .field("checked", &self.entity_check.is_some())
            .finish()
    }
}

/// Everything needed to build a `Route` except the handler.
///
/// Media types are given as strings and parsed when the route is built, an
/// empty list means every registered codec.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    pub method: Method,
    pub path: String,
    pub params: Vec<ParamSpec>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub doc: Option<String>,
    /// name of the entity written on success, used as xml root element
    pub writes: Option<String>,
}

impl RouteConfig {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        RouteConfig {
            method,
            path: path.into(),
            params: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            doc: None,
            writes: None,
        }
    }
}

pub struct Route {
    method: Method,
    pattern: PathPattern,
    params: Vec<ParamSpec>,
    consumes: Vec<MediaType>,
    produces: Vec<MediaType>,
    doc: Option<String>,
    writes: Option<String>,
    handler: Box<dyn Handler>,
}

impl Route {
    pub fn new<H: Handler>(config: RouteConfig, handler: H) -> Result<Route, RouteError> {
        Route::from_boxed(config, Box::new(handler))
    }

    pub fn from_boxed(config: RouteConfig, handler: Box<dyn Handler>) -> Result<Route, RouteError> {
        let RouteConfig { method, path, mut params, consumes, produces, doc, writes } = config;
        let pattern = PathPattern::parse(&path)?;
        let invalid = |msg: String| RouteError::InvalidRoute(format!("{} {}: {}", method, pattern, msg));

        let pattern_params = pattern.param_names();
        for (i, spec) in params.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(invalid("parameter without name".into()));
            }
            let duplicate = params[..i].iter().any(|p| p.location == spec.location && p.name == spec.name);
            if duplicate {
                return Err(invalid(format!("parameter '{}' declared twice", spec.name)));
            }
            match spec.location {
                ParamLocation::Path if !pattern_params.contains(&spec.name.as_str()) => {
                    return Err(invalid(format!("path parameter '{}' is not part of the path", spec.name)));
                }
                ParamLocation::Path | ParamLocation::Query => {
                    if let DataType::Entity(_) = spec.data_type {
                        return Err(invalid(format!("parameter '{}' cannot be an entity", spec.name)));
                    }
                }
                ParamLocation::Body => {}
            }
        }
        if params.iter().filter(|p| p.location == ParamLocation::Body).count() > 1 {
            return Err(invalid("more than one body parameter".into()));
        }

        let undeclared: Vec<String> = pattern_params
            .iter()
            .filter(|name| !params.iter().any(|p| p.location == ParamLocation::Path && p.name == **name))
            .map(|name| name.to_string())
            .collect();
        for name in undeclared {
            params.push(ParamSpec::path(name, ""));
        }

        let consumes = parse_media_types(&consumes)?;
        let produces = parse_media_types(&produces)?;
        if let Some(wildcard) = produces.iter().find(|m| m.is_wildcard()) {
            return Err(RouteError::InvalidMediaType(wildcard.to_string()));
        }

        Ok(Route { method, pattern, params, consumes, produces, doc, writes, handler })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn params_in<'a>(&'a self, location: ParamLocation) -> impl Iterator<Item = &'a ParamSpec> + 'a {
        self.params.iter().filter(move |p| p.location == location)
    }

    pub fn body_param(&self) -> Option<&ParamSpec> {
        self.params_in(ParamLocation::Body).next()
    }

    pub fn consumes(&self) -> &[MediaType] {
        &self.consumes
    }

    pub fn produces(&self) -> &[MediaType] {
        &self.produces
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_ref().map(|d| d.as_str())
    }

    /// entity read from the body
    pub fn reads(&self) -> Option<&str> {
        self.body_param().map(|p| p.name.as_str())
    }

    pub fn writes(&self) -> Option<&str> {
        self.writes.as_ref().map(|w| w.as_str())
    }

    pub fn handler(&self) -> &dyn Handler {
        &*self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Route({} {})", self.method, self.pattern)
    }
}

fn check_duplicate<'a, I: Iterator<Item = &'a Route>>(mut existing: I, route: &Route) -> Result<(), RouteError> {
    if existing.any(|r| r.method == route.method && r.pattern.same_shape(&route.pattern)) {
        Err(RouteError::DuplicateRoute { method: route.method, pattern: route.pattern.to_string() })
    } else {
        Ok(())
    }
}

fn parse_media_types(types: &[String]) -> Result<Vec<MediaType>, RouteError> {
    types
        .iter()
        .map(|t| MediaType::parse(t).ok_or_else(|| RouteError::InvalidMediaType(t.clone())))
        .collect()
}

/// All routes in registration order. The first route matching a request wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        RouteTable::default()
    }

    /// Fails if a route with the same method and path shape exists.
    pub fn register(&mut self, route: Route) -> Result<(), RouteError> {
        check_duplicate(self.routes.iter(), &route)?;
        self.push(route);
        Ok(())
    }

    fn push(&mut self, route: Route) {
        debug!("Registered route {} {}", route.method, route.pattern);
        self.routes.push(route);
    }

    pub fn add<H: Handler>(&mut self, config: RouteConfig, handler: H) -> Result<(), RouteError> {
        self.register(Route::new(config, handler)?)
    }

    pub fn get<P: Into<String>, H: Handler>(&mut self, path: P, handler: H) -> Result<(), RouteError> {
        self.add(RouteConfig::new(Method::Get, path), handler)
    }

    pub fn post<P: Into<String>, H: Handler>(&mut self, path: P, handler: H) -> Result<(), RouteError> {
        self.add(RouteConfig::new(Method::Post, path), handler)
    }

    pub fn put<P: Into<String>, H: Handler>(&mut self, path: P, handler: H) -> Result<(), RouteError> {
        self.add(RouteConfig::new(Method::Put, path), handler)
    }

    pub fn delete<P: Into<String>, H: Handler>(&mut self, path: P, handler: H) -> Result<(), RouteError> {
        self.add(RouteConfig::new(Method::Delete, path), handler)
    }

    /// Registers every route of the service or, on any failure, none of them.
    pub fn add_service(&mut self, service: WebService) -> Result<(), RouteError> {
        let routes = service.into_routes()?;
        for (i, route) in routes.iter().enumerate() {
            check_duplicate(self.routes.iter().chain(routes[..i].iter()), route)?;
        }
        for route in routes {
            self.push(route);
        }
        Ok(())
    }

    /// Lazy iteration in registration order, can be restarted any time.
    pub fn all(&self) -> ::std::slice::Iter<Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn resolve(&self, method: Method, path: &str) -> Resolution {
        matcher::resolve(self, method, path)
    }

    pub fn describe(&self) -> ApiDescription {
        ApiDescription::from_routes(self.all())
    }
}
