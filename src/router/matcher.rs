// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use request::Params;
use super::{Method, Route, RouteTable};
use super::pattern::split_path;

#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

#[derive(Debug)]
pub enum Resolution<'a> {
    Found(RouteMatch<'a>),
    /// the path exists, but only for the given methods
    MethodNotAllowed(Vec<Method>),
    NoMatch,
}

impl<'a> Resolution<'a> {
    pub fn found(self) -> Option<RouteMatch<'a>> {
        match self {
            Resolution::Found(m) => Some(m),
            _ => None,
        }
    }
}

/// First route in registration order whose method and pattern match.
pub fn resolve<'a>(table: &'a RouteTable, method: Method, path: &str) -> Resolution<'a> {
    let segments = split_path(path);
    let mut allowed = Vec::new();

    for route in table.all() {
        if route.method() != method {
            if !allowed.contains(&route.method()) && route.pattern().matches(&segments).is_some() {
                allowed.push(route.method());
            }
            continue;
        }
        if let Some(params) = route.pattern().matches(&segments) {
            trace!("{} {} resolved to {:?}", method, path, route);
            return Resolution::Found(RouteMatch { route, params });
        }
    }

    if allowed.is_empty() {
        Resolution::NoMatch
    } else {
        Resolution::MethodNotAllowed(allowed)
    }
}

/// methods registered for routes matching `path`, in registration order
pub fn allowed_methods(table: &RouteTable, path: &str) -> Vec<Method> {
    let segments = split_path(path);
    let mut allowed = Vec::new();
    for route in table.all() {
        if !allowed.contains(&route.method()) && route.pattern().matches(&segments).is_some() {
            allowed.push(route.method());
        }
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::HandlerError;
    use request::TypedRequest;
    use response::Reply;
    use router::{RouteConfig, ParamSpec};

    fn literal(_: &TypedRequest) -> Result<Reply, HandlerError> {
        Ok(Reply::ok_value(json!("literal")))
    }

    fn param(_: &TypedRequest) -> Result<Reply, HandlerError> {
        Ok(Reply::ok_value(json!("param")))
    }

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.get("/users/me", literal).unwrap();
        table.get("/users/{id}", param).unwrap();
        table.put("/users/{id}", param).unwrap();
        table.delete("/users/{id}", param).unwrap();
        table.post("/users", param).unwrap();
        table.get("/", literal).unwrap();
        table
    }

    #[test]
    fn first_registered_match_wins() {
        let table = table();
        let found = resolve(&table, Method::Get, "/users/me").found().unwrap();
        assert_eq!("/users/me", found.route.pattern().to_string());
        assert!(found.params.is_empty());

        let found = resolve(&table, Method::Get, "/users/42").found().unwrap();
        assert_eq!("/users/{id}", found.route.pattern().to_string());
        assert_eq!(Some("42"), found.params.get("id"));
    }

    #[test]
    fn root_and_trailing_slashes() {
        let table = table();
        assert!(resolve(&table, Method::Get, "/").found().is_some());
        assert!(resolve(&table, Method::Post, "/users/").found().is_some());
    }

    #[test]
    fn no_match_and_method_not_allowed() {
        let table = table();
        match resolve(&table, Method::Get, "/groups/1") {
            Resolution::NoMatch => {}
            other => panic!("expected no match, got {:?}", other),
        }
        match resolve(&table, Method::Get, "/users/1/friends") {
            Resolution::NoMatch => {}
            other => panic!("expected no match, got {:?}", other),
        }
        match resolve(&table, Method::Patch, "/users/1") {
            Resolution::MethodNotAllowed(allowed) => assert_eq!(vec![Method::Get, Method::Put, Method::Delete], allowed),
            other => panic!("expected 405, got {:?}", other),
        }
        assert_eq!(vec![Method::Post], allowed_methods(&table, "/users"));
        assert!(allowed_methods(&table, "/nothing").is_empty());
    }

    #[test]
    fn every_route_resolves_its_own_instantiation() {
        let mut table = table();
        let mut config = RouteConfig::new(Method::Get, "/orgs/{org}/teams/{team}");
        config.params.push(ParamSpec::path("team", "team slug"));
        table.add(config, param).unwrap();

        for route in table.all() {
            let mut params = Params::new();
            for name in route.pattern().param_names() {
                params.insert(name, format!("value of {}", name));
            }
            let path = route.pattern().instantiate(&params).unwrap();
            let found = resolve(&table, route.method(), &path).found().unwrap();
            assert_eq!(route.method(), found.route.method());
            assert_eq!(route.pattern(), found.route.pattern());
            assert_eq!(params, found.params);
        }
    }
}
