// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use error::RouteError;
use handler::Handler;
use super::{Route, RouteConfig};

/// A group of routes below one root path.
///
/// Route paths are relative to `root`. Routes without own consumes or
/// produces types inherit the ones of the service.
pub struct WebService {
    pub root: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    routes: Vec<(RouteConfig, Box<dyn Handler>)>,
}

impl WebService {
    pub fn new<P: Into<String>>(root: P) -> Self {
        WebService { root: root.into(), consumes: Vec::new(), produces: Vec::new(), routes: Vec::new() }
    }

    pub fn route<H: Handler>(&mut self, config: RouteConfig, handler: H) {
        self.routes.push((config, Box::new(handler)));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_routes(self) -> Result<Vec<Route>, RouteError> {
        let WebService { root, consumes, produces, routes } = self;
        routes
            .into_iter()
            .map(|(mut config, handler)| {
                config.path = join(&root, &config.path);
                if config.consumes.is_empty() {
                    config.consumes = consumes.clone();
                }
                if config.produces.is_empty() {
                    config.produces = produces.clone();
                }
                Route::from_boxed(config, handler)
            })
            .collect()
    }
}

impl fmt::Debug for WebService {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WebService({}, {} routes)", self.root, self.routes.len())
    }
}

fn join(root: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        root.to_string()
    } else {
        format!("{}/{}", root.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::MediaType;
    use error::HandlerError;
    use request::TypedRequest;
    use response::Reply;
    use router::{Method, RouteTable};

    fn handle(_: &TypedRequest) -> Result<Reply, HandlerError> {
        Ok(Reply::no_content())
    }

    #[test]
    fn paths_are_joined_with_root() {
        assert_eq!("/users", join("/users", ""));
        assert_eq!("/users/{id}", join("/users", "/{id}"));
        assert_eq!("/users/{id}", join("/users/", "{id}"));
        assert_eq!("/x", join("/", "x"));
    }

    #[test]
    fn routes_inherit_media_types() {
        let mut service = WebService::new("/users");
        service.consumes = vec!["application/xml".into(), "application/json".into()];
        service.produces = vec!["application/json".into()];
        service.route(RouteConfig::new(Method::Get, "/{id}"), handle);
        let mut own = RouteConfig::new(Method::Post, "");
        own.produces = vec!["application/xml".into()];
        service.route(own, handle);
        assert_eq!(2, service.len());

        let mut table = RouteTable::new();
        table.add_service(service).unwrap();
        let routes: Vec<_> = table.all().collect();

        assert_eq!("/users/{id}", routes[0].pattern().to_string());
        assert_eq!(2, routes[0].consumes().len());
        assert_eq!(&[MediaType::parse("application/json").unwrap()], routes[0].produces());
        assert_eq!("/users", routes[1].pattern().to_string());
        assert_eq!(&[MediaType::parse("application/xml").unwrap()], routes[1].produces());
    }

    #[test]
    fn invalid_member_route_fails_the_service() {
        let mut service = WebService::new("/users");
        service.route(RouteConfig::new(Method::Get, "/{id}/{id}"), handle);
        let mut table = RouteTable::new();
        assert!(table.add_service(service).is_err());
        assert!(table.is_empty());
    }
}
