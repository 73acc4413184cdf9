// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use error::HandlerError;
use super::User;

/// Failure of the storage behind a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "storage failure: {}", self.0)
    }
}

impl Error for StorageError {}

impl From<StorageError> for HandlerError {
    fn from(err: StorageError) -> Self {
        HandlerError::internal(err)
    }
}

/// Storage of users by id. Implementations do their own locking, the
/// handlers call them from many threads at once.
pub trait UserRepository: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<User>, StorageError>;

    /// stores the user under its id and returns the replaced one
    fn put(&self, user: User) -> Result<Option<User>, StorageError>;

    fn delete(&self, id: &str) -> Result<Option<User>, StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        InMemoryUserRepository::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // every write is a single map operation, a poisoned map is still consistent
    fn read(&self) -> RwLockReadGuard<HashMap<String, User>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<HashMap<String, User>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for InMemoryUserRepository {
    fn get(&self, id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.read().get(id).cloned())
    }

    fn put(&self, user: User) -> Result<Option<User>, StorageError> {
        trace!("Storing user {}", user.id);
        Ok(self.write().insert(user.id.clone(), user))
    }

    fn delete(&self, id: &str) -> Result<Option<User>, StorageError> {
        trace!("Removing user {}", id);
        Ok(self.write().remove(id))
    }
}
