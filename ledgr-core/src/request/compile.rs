use bytes::Bytes;
use ledgr_http::has_header;
use ledgr_value::Value;

use super::JsonRequest;
use crate::client::Query;
use crate::util::concat_sequences;
use crate::{IntDecoding, Result};

pub const PATH_COMPILE: &str = "/v2/teal/compile";

/// Add `Content-Type: text/plain` unless the caller already set a content type under any casing.
pub fn set_default_content_type(mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
    if !has_header(&headers, "content-type") {
        headers.push(("Content-Type".to_string(), "text/plain".to_string()));
    }
    headers
}

/// `POST /v2/teal/compile` with program source as the body.
///
/// The source may be supplied in several parts; they are sent as one contiguous payload.
#[derive(Debug, Clone, Default)]
pub struct Compile {
    source: Vec<Bytes>,
    sourcemap: Option<bool>,
    int_decoding: IntDecoding,
}

impl Compile {
    pub fn new(source: impl Into<Bytes>) -> Self {
        Self {
            source: vec![source.into()],
            ..Self::default()
        }
    }

    pub fn from_parts<I, B>(parts: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            source: parts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_int_decoding(mut self, int_decoding: IntDecoding) -> Self {
        self.int_decoding = int_decoding;
        self
    }
}

impl JsonRequest for Compile {
    type Output = Value;

    fn path(&self) -> String {
        PATH_COMPILE.to_string()
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        query.insert(
            "sourcemap".to_string(),
            self.sourcemap.map(|v| v.to_string()),
        );
        query
    }

    fn body(&self) -> Option<Bytes> {
        Some(concat_sequences(&self.source))
    }

    fn prepare_headers(&self, headers: Vec<(String, String)>) -> Vec<(String, String)> {
        set_default_content_type(headers)
    }

    fn int_decoding(&self) -> IntDecoding {
        self.int_decoding
    }

    fn prepare(&self, body: Value) -> Result<Value> {
        Ok(body)
    }
}
