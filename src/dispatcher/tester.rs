// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use http::{Request, Response, StatusCode};
use std::sync::Arc;

use body::Body;
use super::Dispatcher;

/// Drives a dispatcher with `http` requests, without any network involved.
/// Clones share the dispatcher and can be moved to other threads.
#[derive(Clone, Debug)]
pub struct ServerTester {
    dispatcher: Arc<Dispatcher>,
}

impl ServerTester {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        ServerTester { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn handle(&self, req: Request<Body>) -> Response<Body> {
        let path = req.uri().path_and_query().map(|p| p.as_str()).unwrap_or_else(|| req.uri().path());
        let response = self.dispatcher.handle(req.method(), path, req.headers(), req.body());

        match response.into_http() {
            Ok(response) => response,
            Err(e) => {
                error!("Could not build response: {}", e);
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}
