#![forbid(unsafe_code)]

mod client;
mod config;
mod decode;
mod error;
mod int_decoding;
pub mod request;
pub mod util;

pub use client::{LedgerClient, Query};
pub use config::{ClientConfig, DEFAULT_TOKEN_HEADER};
pub use decode::{DecodeError, DecodeErrorKind, decode, decode_default, decode_slice};
pub use error::{Error, Result};
pub use int_decoding::{IntDecoding, parse_int_decoding};
pub use ledgr_value::{MAX_SAFE_INTEGER, ObjectMap, Value};
pub use request::JsonRequest;
pub use util::{concat_sequences, is_hosted_runtime, prune_absent_keys, sequence_equal};
