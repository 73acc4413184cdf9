// Copyright 2017 Christian Löhnert. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde_json::{self, Value};
use error::CodecError;
use super::{Codec, MediaType, APPLICATION_JSON};

pub struct JsonCodec {
    types: Vec<MediaType>,
}

impl JsonCodec {
    pub fn new() -> Self {
        let types = MediaType::parse(APPLICATION_JSON).into_iter().collect();
        JsonCodec { types }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        JsonCodec::new()
    }
}

impl Codec for JsonCodec {
    fn media_types(&self) -> &[MediaType] {
        &self.types
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| {
            debug!("Could not parse input as json: {:?}", e);
            CodecError::decode(e)
        })
    }

    fn encode(&self, _root: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::encode)
    }
}
