// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Raw request or response payload.
///
/// `None` means no body was sent at all, `Some` with an empty vector is
/// treated the same way by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body(pub Option<Vec<u8>>);

impl Body {
    pub fn empty() -> Self {
        Body(None)
    }

    /// true if there is nothing to decode
    pub fn is_empty(&self) -> bool {
        match self.0 {
            Some(ref vec) => vec.is_empty(),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map(|v| v.len()).unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u8] {
        match self.0 {
            Some(ref vec) => vec.as_slice(),
            None => &[],
        }
    }

    /// utf8 view of the body, mostly useful in tests
    pub fn to_string(&self) -> Option<String> {
        match self.0 {
            Some(ref vec) => ::std::str::from_utf8(vec).ok().map(|s| s.to_string()),
            None => None,
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(o: Vec<u8>) -> Self {
        Body(Some(o))
    }
}

impl From<String> for Body {
    fn from(o: String) -> Self {
        Body::from(o.into_bytes())
    }
}

impl<'a> From<&'a str> for Body {
    fn from(o: &'a str) -> Self {
        Body::from(Vec::from(o.as_bytes()))
    }
}
