// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Rest Resource
//!
//! A typed resource router on top of the [http](https://github.com/carllerche/http) crate.
//!
//! Routes are declared once with their parameters and media types. Requests are
//! matched, their parameters and bodies bound and checked, and the reply is
//! encoded in a format the client accepts. Handlers only see a `TypedRequest`
//! and return a `Reply` or a `HandlerError`.
//!
//! Listening on a socket is not part of this crate, anything that can produce
//! `http::Request`s can drive a `Dispatcher`.
//!
//! ## Features
//!
//! ### Declared routes
//!
//! ```rust
//! extern crate rest_resource;
//! #[macro_use]
//! extern crate serde_derive;
//!
//! use rest_resource::*;
//!
//! #[derive(Serialize, Deserialize, Debug)]
//! struct Hello {
//!     world: String,
//! }
//!
//! fn get_hello(req: &TypedRequest) -> Result<Reply, HandlerError> {
//!     let world = req.param("world").unwrap_or("Sauerland");
//!     Reply::ok(&Hello { world: world.into() })
//! }
//!
//! fn main() {
//!     let mut config = RouteConfig::new(Method::Get, "/hello/{world}");
//!     config.params.push(ParamSpec::path("world", "whom to greet"));
//!     config.produces = vec!["application/json".into(), "application/xml".into()];
//!     config.writes = Some("Hello".into());
//!
//!     let mut routes = RouteTable::new();
//!     routes.add(config, get_hello).unwrap();
//!     assert!(routes.get("/hello/{other}", get_hello).is_err());
//! }
//! ```
//!
//! ### Resources
//!
//! Routes sharing a root path and media types are grouped in a `WebService`.
//! The shipped user resource is built that way:
//!
//! ```rust
//! extern crate rest_resource;
//!
//! use std::sync::Arc;
//! use rest_resource::*;
//!
//! fn main() {
//!     let repo = Arc::new(InMemoryUserRepository::new());
//!     let mut routes = RouteTable::new();
//!     routes.add_service(user_service(repo)).unwrap();
//!
//!     let docs = routes.describe();
//!     assert_eq!(4, docs.routes.len());
//! }
//! ```
//!
//! ### Testing
//!
//! ```
//! extern crate rest_resource;
//! extern crate http;
//!
//! use std::str::FromStr;
//! use rest_resource::*;
//! use http::request::Builder as RequestBuilder;
//! use http::Uri;
//!
//! fn hello_world(req: &TypedRequest) -> Result<Reply, HandlerError> {
//!     Reply::ok(&req.param("world").unwrap_or("sauerland"))
//! }
//! fn main() {
//!     let mut r = RouteTable::new();
//!     r.get("/hello/:world", hello_world).unwrap();
//!
//!     let tester = Dispatcher::new(r, CodecRegistry::default()).start_testing();
//!
//!     let request = RequestBuilder::new().uri(Uri::from_str("/hello/huhu").unwrap()).body(Body::empty()).unwrap();
//!     let response = tester.handle(request);
//!     let answer_string = response.body().to_string().unwrap();
//!
//!     assert_eq!(200, response.status().as_u16());
//!     assert_eq!("\"huhu\"", answer_string);
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is answered with a status and a `{kind, message}` body.
//! Internal errors are logged but only a generic message reaches the client.

extern crate url;
extern crate serde;
#[macro_use]
extern crate serde_json;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;
extern crate http;
extern crate quick_xml;
#[cfg(test)]
extern crate spectral;
#[cfg(test)]
extern crate env_logger;
#[cfg(test)]
#[macro_use]
extern crate proptest;

pub mod body;
pub mod codec;
pub mod router;
pub mod request;
pub mod response;
pub mod handler;
pub mod error;
pub mod dispatcher;
pub mod docs;
pub mod users;

pub use body::Body;
pub use codec::{Codec, CodecRegistry, JsonCodec, MediaType, XmlCodec};
pub use router::{DataType, Method, ParamLocation, ParamSpec, Route, RouteConfig, RouteTable, WebService};
pub use request::{Params, TypedRequest};
pub use response::{Reply, TypedResponse};
pub use handler::Handler;
pub use error::{BindError, CodecError, ErrorKind, HandlerError, HttpError, RouteError};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use dispatcher::tester::ServerTester;
pub use docs::ApiDescription;
pub use users::{user_service, InMemoryUserRepository, StorageError, User, UserRepository};
