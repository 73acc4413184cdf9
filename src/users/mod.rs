// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The user resource below `/users`.
//!
//! | method | path               | body   | success           |
//! |--------|--------------------|--------|-------------------|
//! | GET    | `/users/{user-id}` |        | 200 with the user |
//! | POST   | `/users`           | `User` | 200 with the user |
//! | PUT    | `/users/{user-id}` | `User` | 201 with the user |
//! | DELETE | `/users/{user-id}` |        | 204               |
//!
//! Bodies are read as xml or json and written as json or xml.

use std::sync::Arc;
use codec::{APPLICATION_JSON, APPLICATION_XML};
use error::HandlerError;
use request::TypedRequest;
use response::Reply;
use router::{Method, ParamSpec, RouteConfig, WebService};

mod repository;

pub use self::repository::{InMemoryUserRepository, StorageError, UserRepository};

pub const USER_ID: &str = "user-id";
pub const USER_ENTITY: &str = "User";

/// Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        User { id: id.into(), name: name.into() }
    }
}

/// Builds the user routes on top of `repo`.
pub fn user_service(repo: Arc<dyn UserRepository>) -> WebService {
    let mut ws = WebService::new("/users");
    ws.consumes = vec![APPLICATION_XML.into(), APPLICATION_JSON.into()];
    ws.produces = vec![APPLICATION_JSON.into(), APPLICATION_XML.into()];

    let mut config = RouteConfig::new(Method::Get, "/{user-id}");
    config.doc = Some("get a user".into());
    config.params.push(ParamSpec::path(USER_ID, "identifier of the user"));
    config.writes = Some(USER_ENTITY.into());
    let r = repo.clone();
    ws.route(config, move |req: &TypedRequest| -> Result<Reply, HandlerError> { find_user(&*r, req) });

    let mut config = RouteConfig::new(Method::Post, "");
    config.doc = Some("update a user".into());
    config.params.push(ParamSpec::body::<User, _, _>(USER_ENTITY, "representation of a user"));
    config.writes = Some(USER_ENTITY.into());
    let r = repo.clone();
    ws.route(config, move |req: &TypedRequest| -> Result<Reply, HandlerError> { update_user(&*r, req) });

    let mut config = RouteConfig::new(Method::Put, "/{user-id}");
    config.doc = Some("create a user".into());
    config.params.push(ParamSpec::path(USER_ID, "identifier of the user"));
    config.params.push(ParamSpec::body::<User, _, _>(USER_ENTITY, "representation of a user"));
    config.writes = Some(USER_ENTITY.into());
    let r = repo.clone();
    ws.route(config, move |req: &TypedRequest| -> Result<Reply, HandlerError> { create_user(&*r, req) });

    let mut config = RouteConfig::new(Method::Delete, "/{user-id}");
    config.doc = Some("delete a user".into());
    config.params.push(ParamSpec::path(USER_ID, "identifier of the user"));
    ws.route(config, move |req: &TypedRequest| -> Result<Reply, HandlerError> { remove_user(&*repo, req) });

    ws
}

fn user_id(req: &TypedRequest) -> Result<&str, HandlerError> {
    req.param(USER_ID).ok_or_else(|| HandlerError::bad_request("missing user id"))
}

pub fn find_user(repo: &dyn UserRepository, req: &TypedRequest) -> Result<Reply, HandlerError> {
    let id = user_id(req)?;
    match repo.get(id)? {
        Some(user) => Reply::ok(&user),
        None => Err(HandlerError::not_found(format!("user {} not found", id))),
    }
}

pub fn update_user(repo: &dyn UserRepository, req: &TypedRequest) -> Result<Reply, HandlerError> {
    let user: User = req.entity()?;
    if user.id.is_empty() {
        return Err(HandlerError::bad_request("user id must not be empty"));
    }
    repo.put(user.clone())?;
    debug!("Updated user {}", user.id);
    Reply::ok(&user)
}

/// The path id wins: a body without id gets it, a body with another id is rejected.
pub fn create_user(repo: &dyn UserRepository, req: &TypedRequest) -> Result<Reply, HandlerError> {
    let id = user_id(req)?;
    let mut user: User = req.entity()?;
    if user.id.is_empty() {
        user.id = id.to_string();
    } else if user.id != id {
        return Err(HandlerError::bad_request(format!("user id {} does not match path id {}", user.id, id)));
    }
    repo.put(user.clone())?;
    debug!("Created user {}", user.id);
    Reply::created(&user)
}

pub fn remove_user(repo: &dyn UserRepository, req: &TypedRequest) -> Result<Reply, HandlerError> {
    let id = user_id(req)?;
    if repo.delete(id)?.is_some() {
        debug!("Removed user {}", id);
    }
    Ok(Reply::no_content())
}
