//! Typed requests against node endpoints.
//!
//! A request describes its path, query and body; [`LedgerClient::send`](crate::LedgerClient::send)
//! performs it and decodes the response body with the request's own [`IntDecoding`].

mod compile;
mod supply;

use bytes::Bytes;
use ledgr_value::Value;

use crate::client::Query;
use crate::{IntDecoding, Result};

pub use compile::{Compile, set_default_content_type};
pub use supply::{Supply, SupplyResponse};

pub trait JsonRequest {
    type Output;

    fn path(&self) -> String;

    fn query(&self) -> Query {
        Query::new()
    }

    /// `Some` turns the request into a POST.
    fn body(&self) -> Option<Bytes> {
        None
    }

    /// Adjust caller-supplied headers before sending.
    fn prepare_headers(&self, headers: Vec<(String, String)>) -> Vec<(String, String)> {
        headers
    }

    fn int_decoding(&self) -> IntDecoding {
        IntDecoding::Default
    }

    /// Turn the decoded body into the request's output.
    fn prepare(&self, body: Value) -> Result<Self::Output>;
}
