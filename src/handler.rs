// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use request::TypedRequest;
use error::HandlerError;
use response::Reply;

/// Business logic behind a route. Handlers run concurrently on many request
/// threads and must not keep per call state.
pub trait Handler: Send + Sync + 'static
{
    fn handle(&self, req: &TypedRequest) -> Result<Reply, HandlerError>;
}

impl<F> Handler for F
    where F: Send + Sync + 'static + Fn(&TypedRequest) -> Result<Reply, HandlerError>,
{
    fn handle(&self, req: &TypedRequest) -> Result<Reply, HandlerError> {
        (*self)(req)
    }
}
