// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
extern crate rest_resource;
extern crate env_logger;
extern crate http;
extern crate serde_json;
#[macro_use]
extern crate log;

use std::sync::Arc;
use http::Request;
use http::header::{ACCEPT, CONTENT_TYPE};
use rest_resource::*;

fn send(tester: &ServerTester, request: Request<Body>) {
    let description = format!("{} {}", request.method(), request.uri());
    let response = tester.handle(request);
    let body = response.body().to_string().unwrap_or_default();
    info!("{} -> {} {}", description, response.status(), body);
    println!("{} -> {} {}", description, response.status(), body);
}

fn main() {
    let _ = env_logger::try_init();

    let repo = Arc::new(InMemoryUserRepository::new());
    let mut routes = RouteTable::new();
    routes.add_service(user_service(repo)).unwrap();

    let dispatcher = Dispatcher::new(routes, CodecRegistry::default());
    println!("{}", serde_json::to_string_pretty(&dispatcher.describe()).unwrap());
    let tester = dispatcher.start_testing();

    send(&tester, Request::put("/users/1")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"id":"1","name":"Melissa Raspberry"}"#))
        .unwrap());
    send(&tester, Request::get("/users/1").body(Body::empty()).unwrap());
    send(&tester, Request::get("/users/1")
        .header(ACCEPT, "application/xml")
        .body(Body::empty())
        .unwrap());
    send(&tester, Request::post("/users")
        .header(CONTENT_TYPE, "application/xml")
        .body(Body::from("<User><id>1</id><name>Melissa Strawberry</name></User>"))
        .unwrap());
    send(&tester, Request::delete("/users/1").body(Body::empty()).unwrap());
    send(&tester, Request::get("/users/1").body(Body::empty()).unwrap());
}
