// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Route metadata for documentation generators.
//!
//! `ApiDescription` serializes to a plain document that a swagger or
//! openapi renderer can consume. Rendering itself is not done here.

use router::{DataType, Method, ParamLocation, ParamSpec, Route};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDescription {
    pub routes: Vec<RouteDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDescription {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub parameters: Vec<ParamDescription>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reads: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescription {
    pub name: String,
    pub location: ParamLocation,
    pub data_type: DataType,
    pub description: String,
    pub required: bool,
}

impl ApiDescription {
    pub fn from_routes<'a, I: IntoIterator<Item = &'a Route>>(routes: I) -> Self {
        ApiDescription { routes: routes.into_iter().map(RouteDescription::from).collect() }
    }

    pub fn find(&self, method: Method, path: &str) -> Option<&RouteDescription> {
        self.routes.iter().find(|r| r.method == method && r.path == path)
    }
}

impl<'a> From<&'a Route> for RouteDescription {
    fn from(route: &'a Route) -> Self {
        RouteDescription {
            method: route.method(),
            path: route.pattern().to_string(),
            doc: route.doc().map(|d| d.to_string()),
            parameters: route.params().iter().map(ParamDescription::from).collect(),
            consumes: route.consumes().iter().map(|m| m.to_string()).collect(),
            produces: route.produces().iter().map(|m| m.to_string()).collect(),
            reads: route.reads().map(|r| r.to_string()),
            writes: route.writes().map(|w| w.to_string()),
        }
    }
}

impl<'a> From<&'a ParamSpec> for ParamDescription {
    fn from(spec: &'a ParamSpec) -> Self {
        ParamDescription {
            name: spec.name.clone(),
            location: spec.location,
            data_type: spec.data_type.clone(),
            description: spec.description.clone(),
            required: spec.required,
        }
    }
}
