// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! All error types of the crate.
//!
//! `RouteError` is returned while the route table is assembled and always
//! indicates a programming error. Everything else is a per request failure
//! which the dispatcher turns into an `HttpError`: a status code plus a
//! structured `{kind, message}` body.

use std::error::Error;
use std::fmt;
use http::StatusCode;
use router::{DataType, Method};

/// message sent to the client for every failure it must not see details of
pub const GENERIC_INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoMatch,
    MethodNotAllowed,
    UnsupportedMediaType,
    NotAcceptable,
    PayloadTooLarge,
    MissingParameter,
    TypeConversion,
    Decode,
    NotFound,
    BadRequest,
    Internal,
    Encode,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        use self::ErrorKind::*;

        match *self {
            NoMatch | NotFound => StatusCode::NOT_FOUND,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            MissingParameter | TypeConversion | Decode | BadRequest => StatusCode::BAD_REQUEST,
            Internal | Encode => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body written for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// A request level failure, ready to be written back to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpError {
    kind: ErrorKind,
    msg: String,
    allow: Vec<Method>,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.status(), self.msg)
    }
}

impl Error for HttpError {}

impl HttpError {
    pub fn new<S: Into<String>>(kind: ErrorKind, msg: S) -> Self {
        HttpError { kind, msg: msg.into(), allow: Vec::new() }
    }

    pub fn no_match<S: AsRef<str>>(path: S) -> Self {
        Self::new(ErrorKind::NoMatch, format!("no route for {}", path.as_ref()))
    }

    pub fn method_not_allowed(method: &str, allow: Vec<Method>) -> Self {
        let mut err = Self::new(ErrorKind::MethodNotAllowed, format!("method {} not allowed", method));
        err.allow = allow;
        err
    }

    pub fn unsupported_media_type<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::UnsupportedMediaType, msg)
    }

    pub fn not_acceptable<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::NotAcceptable, msg)
    }

    pub fn payload_too_large(size: usize, max: usize) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, format!("body of {} bytes exceeds limit of {} bytes", size, max))
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }

    /// the detail is only logged, the client sees a generic message
    pub fn internal_server_error<S: AsRef<str>>(detail: S) -> Self {
        error!("Internal error: {}", detail.as_ref());
        Self::new(ErrorKind::Internal, GENERIC_INTERNAL_MESSAGE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn message(&self) -> &str {
        self.msg.as_str()
    }

    /// methods to announce in the `Allow` header of a 405
    pub fn allow(&self) -> &[Method] {
        &self.allow
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody { kind: self.kind, message: self.msg.clone() }
    }
}

/// Failure while assembling the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    DuplicateRoute { method: Method, pattern: String },
    InvalidPattern { pattern: String, reason: String },
    InvalidRoute(String),
    InvalidMediaType(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RouteError::DuplicateRoute { ref method, ref pattern } => write!(f, "route {} {} is already registered", method, pattern),
            RouteError::InvalidPattern { ref pattern, ref reason } => write!(f, "invalid path pattern '{}': {}", pattern, reason),
            RouteError::InvalidRoute(ref msg) => write!(f, "invalid route: {}", msg),
            RouteError::InvalidMediaType(ref mime) => write!(f, "invalid media type '{}'", mime),
        }
    }
}

impl Error for RouteError {}

/// Failure of a codec lookup, decode or encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Unsupported(String),
    NotAcceptable(String),
    Decode(String),
    Encode(String),
}

impl CodecError {
    pub fn decode<S: ToString>(cause: S) -> Self {
        CodecError::Decode(cause.to_string())
    }

    pub fn encode<S: ToString>(cause: S) -> Self {
        CodecError::Encode(cause.to_string())
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CodecError::Unsupported(ref mime) => write!(f, "no codec registered for {}", mime),
            CodecError::NotAcceptable(ref accept) => write!(f, "none of the acceptable types '{}' can be produced", accept),
            CodecError::Decode(ref cause) => write!(f, "could not decode body: {}", cause),
            CodecError::Encode(ref cause) => write!(f, "could not encode body: {}", cause),
        }
    }
}

impl Error for CodecError {}

/// Failure while binding a matched request to its route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    MissingParameter(String),
    TypeConversion { name: String, expected: DataType, value: String },
    Decode(CodecError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BindError::MissingParameter(ref name) => write!(f, "missing parameter '{}'", name),
            BindError::TypeConversion { ref name, ref expected, ref value } => {
                write!(f, "parameter '{}' must be of type {}, got '{}'", name, expected, value)
            }
            BindError::Decode(ref cause) => write!(f, "{}", cause),
        }
    }
}

impl Error for BindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            BindError::Decode(ref cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<CodecError> for BindError {
    fn from(err: CodecError) -> Self {
        BindError::Decode(err)
    }
}

/// Error raised by a handler.
///
/// `NotFound` and `BadRequest` are passed to the client as they are,
/// `Internal` is opaque and turns into a generic 500.
#[derive(Debug)]
pub enum HandlerError {
    NotFound(String),
    BadRequest(String),
    Internal(Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        HandlerError::NotFound(msg.into())
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        HandlerError::BadRequest(msg.into())
    }

    pub fn internal<E: Into<Box<dyn Error + Send + Sync>>>(err: E) -> Self {
        HandlerError::Internal(err.into())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HandlerError::NotFound(ref msg) => write!(f, "not found: {}", msg),
            HandlerError::BadRequest(ref msg) => write!(f, "bad request: {}", msg),
            HandlerError::Internal(ref err) => write!(f, "internal: {}", err),
        }
    }
}

impl Error for HandlerError {}

impl From<::serde_json::Error> for HandlerError {
    fn from(err: ::serde_json::Error) -> Self {
        HandlerError::internal(err)
    }
}

impl From<BindError> for HttpError {
    fn from(err: BindError) -> Self {
        let kind = match err {
            BindError::MissingParameter(_) => ErrorKind::MissingParameter,
            BindError::TypeConversion { .. } => ErrorKind::TypeConversion,
            BindError::Decode(_) => ErrorKind::Decode,
        };
        HttpError::new(kind, err.to_string())
    }
}

impl From<HandlerError> for HttpError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::NotFound(msg) => HttpError::not_found(msg),
            HandlerError::BadRequest(msg) => HttpError::bad_request(msg),
            HandlerError::Internal(cause) => HttpError::internal_server_error(cause.to_string()),
        }
    }
}

impl From<CodecError> for HttpError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Unsupported(_) => HttpError::unsupported_media_type(err.to_string()),
            CodecError::NotAcceptable(_) => HttpError::not_acceptable(err.to_string()),
            CodecError::Decode(_) => HttpError::new(ErrorKind::Decode, err.to_string()),
            CodecError::Encode(ref cause) => {
                error!("Failed to encode response: {}", cause);
                HttpError::new(ErrorKind::Encode, GENERIC_INTERNAL_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn internal_details_are_not_exposed() {
        let err: HttpError = HandlerError::internal(io::Error::new(io::ErrorKind::Other, "disk on fire at /var/db")).into();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status());
        assert_eq!(GENERIC_INTERNAL_MESSAGE, err.message());

        let err: HttpError = CodecError::encode("secret").into();
        assert_eq!(ErrorKind::Encode, err.kind());
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn bind_errors_are_bad_requests() {
        let err: HttpError = BindError::MissingParameter("user-id".into()).into();
        assert_eq!(StatusCode::BAD_REQUEST, err.status());
        assert_eq!(ErrorKind::MissingParameter, err.kind());
        assert!(err.message().contains("user-id"));

        let err: HttpError = BindError::TypeConversion { name: "n".into(), expected: DataType::Integer, value: "x".into() }.into();
        assert_eq!(ErrorKind::TypeConversion, err.kind());
        assert_eq!("parameter 'n' must be of type integer, got 'x'", err.message());
    }

    #[test]
    fn error_body_serializes_kind_in_snake_case() {
        let body = HttpError::unsupported_media_type("nope").to_body();
        let json = ::serde_json::to_string(&body).unwrap();
        assert_eq!(r#"{"kind":"unsupported_media_type","message":"nope"}"#, json);
    }
}
