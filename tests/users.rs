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
#[macro_use]
extern crate serde_json;
extern crate spectral;

use std::sync::Arc;
use std::thread;
use http::{Request, Response, StatusCode};
use http::header::{ALLOW, CONTENT_TYPE};
use rest_resource::*;
use spectral::prelude::*;

const MELISSA_JSON: &str = r#"{"id":"1","name":"Melissa Raspberry"}"#;
const MELISSA_XML: &str = "<User><id>1</id><name>Melissa Raspberry</name></User>";

fn tester_with(repo: Arc<dyn UserRepository>) -> ServerTester {
    let _ = env_logger::try_init();
    let mut routes = RouteTable::new();
    routes.add_service(user_service(repo)).unwrap();
    Dispatcher::new(routes, CodecRegistry::default()).start_testing()
}

fn tester() -> (ServerTester, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    (tester_with(repo.clone()), repo)
}

fn request(method: &str, uri: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
    let mut builder = Request::builder();
    builder.method(method).uri(uri);
    for &(name, value) in headers {
        builder.header(name, value);
    }
    builder.body(Body::from(body)).unwrap()
}

fn header<'a>(response: &'a Response<Body>, name: http::header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn body(response: &Response<Body>) -> String {
    response.body().to_string().unwrap_or_default()
}

fn json_body(response: &Response<Body>) -> serde_json::Value {
    serde_json::from_slice(response.body().as_slice()).unwrap()
}

fn create_melissa(tester: &ServerTester) {
    let response = tester.handle(request("PUT", "/users/1", &[("content-type", "application/json")], MELISSA_JSON));
    assert_eq!(StatusCode::CREATED, response.status());
}

#[test]
fn put_then_get_as_json() {
    let (tester, _) = tester();
    create_melissa(&tester);

    let response = tester.handle(request("GET", "/users/1", &[("accept", "application/json")], ""));
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(Some("application/json"), header(&response, CONTENT_TYPE));
    assert_eq!(json!({"id": "1", "name": "Melissa Raspberry"}), json_body(&response));
}

#[test]
fn get_as_xml() {
    let (tester, _) = tester();
    create_melissa(&tester);

    let response = tester.handle(request("GET", "/users/1", &[("accept", "application/xml")], ""));
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(Some("application/xml"), header(&response, CONTENT_TYPE));
    assert_eq!(MELISSA_XML, body(&response));
}

#[test]
fn without_accept_the_first_produced_type_wins() {
    let (tester, _) = tester();
    create_melissa(&tester);

    let response = tester.handle(request("GET", "/users/1", &[], ""));
    assert_eq!(Some("application/json"), header(&response, CONTENT_TYPE));

    let response = tester.handle(request("GET", "/users/1", &[("accept", "application/xml;q=0.9, application/json")], ""));
    assert_eq!(Some("application/json"), header(&response, CONTENT_TYPE));

    let response = tester.handle(request("GET", "/users/1", &[("accept", "text/*")], ""));
    assert_eq!(StatusCode::NOT_ACCEPTABLE, response.status());
}

#[test]
fn excluded_types_are_never_chosen() {
    let (tester, _) = tester();
    create_melissa(&tester);

    let response = tester.handle(request("GET", "/users/1", &[("accept", "application/json;q=0, */*")], ""));
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(Some("application/xml"), header(&response, CONTENT_TYPE));
    assert_eq!(MELISSA_XML, body(&response));

    let response = tester.handle(request("GET", "/users/1", &[("accept", "application/*;q=0, */*")], ""));
    assert_eq!(StatusCode::NOT_ACCEPTABLE, response.status());
}

#[test]
fn xml_and_json_bodies_store_the_same_user() {
    let (tester, repo) = tester();
    let response = tester.handle(request("PUT", "/users/1", &[("content-type", "application/xml")], MELISSA_XML));
    assert_eq!(StatusCode::CREATED, response.status());
    let from_xml = repo.get("1").unwrap();

    let (tester, repo) = self::tester();
    create_melissa(&tester);
    assert_eq!(from_xml, repo.get("1").unwrap());
    assert_eq!(Some(User::new("1", "Melissa Raspberry")), from_xml);
}

#[test]
fn unknown_user_is_not_found() {
    let (tester, _) = tester();
    let response = tester.handle(request("GET", "/users/42", &[], ""));
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    assert_eq!("not_found", json_body(&response)["kind"]);
}

#[test]
fn unsupported_content_type() {
    let (tester, repo) = tester();
    let response = tester.handle(request("PUT", "/users/1", &[("content-type", "application/unsupported-type")], MELISSA_JSON));
    assert_eq!(StatusCode::UNSUPPORTED_MEDIA_TYPE, response.status());
    assert!(repo.is_empty());

    let response = tester.handle(request("PUT", "/users/1", &[], MELISSA_JSON));
    assert_eq!(StatusCode::UNSUPPORTED_MEDIA_TYPE, response.status());
}

#[test]
fn delete_is_idempotent() {
    let (tester, repo) = tester();
    create_melissa(&tester);

    let response = tester.handle(request("DELETE", "/users/1", &[], ""));
    assert_eq!(StatusCode::NO_CONTENT, response.status());
    assert!(response.body().is_empty());
    assert!(repo.is_empty());

    let response = tester.handle(request("DELETE", "/users/1", &[], ""));
    assert_eq!(StatusCode::NO_CONTENT, response.status());

    let response = tester.handle(request("GET", "/users/1", &[], ""));
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[test]
fn post_updates_an_existing_user() {
    let (tester, repo) = tester();
    create_melissa(&tester);

    let response = tester.handle(request(
        "POST",
        "/users",
        &[("content-type", "application/xml"), ("accept", "application/xml")],
        "<User><id>1</id><name>Melissa Strawberry</name></User>",
    ));
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!("<User><id>1</id><name>Melissa Strawberry</name></User>", body(&response));
    assert_eq!(Some(User::new("1", "Melissa Strawberry")), repo.get("1").unwrap());
}

#[test]
fn client_errors() {
    let (tester, repo) = tester();
    let json = ("content-type", "application/json");

    let response = tester.handle(request("PUT", "/users/1", &[json], "{\"id\":"));
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!("decode", json_body(&response)["kind"]);

    let response = tester.handle(request("PUT", "/users/1", &[("content-type", "application/xml")], "<User><id>1</name></User>"));
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(
        json!({"kind": "decode", "message": "could not decode body: body is not valid application/xml"}),
        json_body(&response)
    );

    let response = tester.handle(request("PUT", "/users/1", &[json], ""));
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!("missing_parameter", json_body(&response)["kind"]);

    let response = tester.handle(request("PUT", "/users/1", &[json], r#"{"id":"2","name":"x"}"#));
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let response = tester.handle(request("POST", "/users", &[json], r#"{"name":"x"}"#));
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let response = tester.handle(request("GET", "/users/1/friends", &[], ""));
    assert_eq!(StatusCode::NOT_FOUND, response.status());

    let response = tester.handle(request("GET", "/users/", &[], ""));
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());
    assert_eq!(Some("POST"), header(&response, ALLOW));
    assert!(repo.is_empty());
}

#[test]
fn method_not_allowed_lists_the_alternatives() {
    let (tester, _) = tester();
    let response = tester.handle(request("PATCH", "/users/1", &[], ""));
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());
    assert_eq!(Some("GET, PUT, DELETE"), header(&response, ALLOW));

    let response = tester.handle(request("GET", "/people/1", &[], ""));
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    assert_that(&header(&response, ALLOW)).is_none();
}

#[test]
fn rejected_negotiation_does_not_touch_storage() {
    let (tester, repo) = tester();
    let response = tester.handle(request(
        "PUT",
        "/users/1",
        &[("content-type", "application/json"), ("accept", "text/html")],
        MELISSA_JSON,
    ));
    assert_eq!(StatusCode::NOT_ACCEPTABLE, response.status());
    assert!(repo.is_empty());
}

#[test]
fn error_body_uses_an_accepted_format() {
    let (tester, _) = tester();
    let response = tester.handle(request("GET", "/users/42", &[("accept", "application/xml")], ""));
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    assert_eq!(Some("application/xml"), header(&response, CONTENT_TYPE));
    assert!(body(&response).starts_with("<Error><kind>not_found</kind>"));
}

#[test]
fn oversized_bodies_are_rejected() {
    let repo = Arc::new(InMemoryUserRepository::new());
    let mut routes = RouteTable::new();
    routes.add_service(user_service(repo.clone())).unwrap();
    let config = DispatcherConfig { max_body_size: 16 };
    let tester = Dispatcher::with_config(routes, CodecRegistry::default(), config).start_testing();

    let response = tester.handle(request("PUT", "/users/1", &[("content-type", "application/json")], MELISSA_JSON));
    assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, response.status());
    assert!(repo.is_empty());
}

struct BrokenRepository;

impl UserRepository for BrokenRepository {
    fn get(&self, _: &str) -> Result<Option<User>, StorageError> {
        Err(StorageError("connection to db.internal:5432 refused".into()))
    }

    fn put(&self, _: User) -> Result<Option<User>, StorageError> {
        Err(StorageError("connection to db.internal:5432 refused".into()))
    }

    fn delete(&self, _: &str) -> Result<Option<User>, StorageError> {
        Err(StorageError("connection to db.internal:5432 refused".into()))
    }
}

#[test]
fn storage_failures_are_opaque() {
    let tester = tester_with(Arc::new(BrokenRepository));
    let response = tester.handle(request("GET", "/users/1", &[], ""));
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    assert!(!body(&response).contains("db.internal"));
    assert_eq!(json!({"kind": "internal", "message": "internal server error"}), json_body(&response));
}

#[test]
fn concurrent_requests_on_disjoint_ids() {
    let (tester, repo) = tester();
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let tester = tester.clone();
            thread::spawn(move || {
                let id = i.to_string();
                let uri = format!("/users/{}", id);
                let user = format!(r#"{{"id":"{}","name":"user {}"}}"#, id, id);
                let response = tester.handle(request("PUT", &uri, &[("content-type", "application/json")], &user));
                assert_eq!(StatusCode::CREATED, response.status());

                let response = tester.handle(request("GET", &uri, &[], ""));
                assert_eq!(StatusCode::OK, response.status());
                assert_eq!(json!({"id": id, "name": format!("user {}", i)}), json_body(&response));
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }
    assert_eq!(8, repo.len());
}

#[test]
fn describes_the_user_resource() {
    let (tester, _) = tester();
    let docs = tester.dispatcher().describe();
    assert_eq!(4, docs.routes.len());

    let get = docs.find(Method::Get, "/users/{user-id}").unwrap();
    assert_eq!(Some("get a user".to_string()), get.doc);
    assert_eq!(Some("User".to_string()), get.writes);
    assert_eq!(vec!["application/json".to_string(), "application/xml".to_string()], get.produces);

    let put = docs.find(Method::Put, "/users/{user-id}").unwrap();
    assert_eq!(Some("User".to_string()), put.reads);
    assert_eq!(vec!["application/xml".to_string(), "application/json".to_string()], put.consumes);
}
