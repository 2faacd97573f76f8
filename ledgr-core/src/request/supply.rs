use ledgr_value::Value;
use num_bigint::BigInt;

use super::JsonRequest;
use crate::{Error, IntDecoding, Result};

pub const PATH_SUPPLY: &str = "/v2/ledger/supply";

/// `GET /v2/ledger/supply`. Output is the decoded body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Supply {
    int_decoding: IntDecoding,
}

impl Supply {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_int_decoding(mut self, int_decoding: IntDecoding) -> Self {
        self.int_decoding = int_decoding;
        self
    }
}

impl JsonRequest for Supply {
    type Output = Value;

    fn path(&self) -> String {
        PATH_SUPPLY.to_string()
    }

    fn int_decoding(&self) -> IntDecoding {
        self.int_decoding
    }

    fn prepare(&self, body: Value) -> Result<Value> {
        Ok(body)
    }
}

/// Exact view of a supply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyResponse {
    pub current_round: BigInt,
    pub online_money: BigInt,
    pub total_money: BigInt,
}

impl TryFrom<&Value> for SupplyResponse {
    type Error = Error;

    /// Fails when a field is missing or was decoded lossily (an oversized amount under
    /// [`IntDecoding::Default`]).
    fn try_from(body: &Value) -> Result<Self> {
        let field = |name: &str| -> Result<BigInt> {
            let v = body
                .get(name)
                .ok_or_else(|| Error::UnexpectedResponse(format!("supply: missing `{name}`")))?;
            v.to_bigint().ok_or_else(|| {
                Error::UnexpectedResponse(format!(
                    "supply: `{name}` is not an exact integer (got {} {v})",
                    v.kind()
                ))
            })
        };

        Ok(Self {
            current_round: field("current_round")?,
            online_money: field("online-money")?,
            total_money: field("total-money")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    const BODY: &str =
        r#"{"current_round":4021,"online-money":18446744073709551615,"total-money":10000000000000000000}"#;

    fn ok<T, E: std::fmt::Display>(r: std::result::Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn supply_request_shape() {
        let req = Supply::new().with_int_decoding(IntDecoding::Mixed);
        assert_eq!(req.path(), "/v2/ledger/supply");
        assert!(req.body().is_none());
        assert!(req.query().is_empty());
        assert_eq!(req.int_decoding(), IntDecoding::Mixed);
        assert_eq!(Supply::new().int_decoding(), IntDecoding::Default);
    }

    #[test]
    fn typed_view_is_exact_under_mixed() {
        let body = ok(decode(BODY, IntDecoding::Mixed));
        let supply = ok(SupplyResponse::try_from(&body));
        assert_eq!(supply.current_round, BigInt::from(4021));
        assert_eq!(supply.online_money, BigInt::from(u64::MAX));
        assert_eq!(supply.total_money, BigInt::from(10_000_000_000_000_000_000u128));
    }

    #[test]
    fn typed_view_rejects_lossy_amounts() {
        let body = ok(decode(BODY, IntDecoding::Default));
        let err = match SupplyResponse::try_from(&body) {
            Ok(v) => panic!("expected error, got {v:?}"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("online-money"), "{err}");
    }

    #[test]
    fn typed_view_reports_missing_fields() {
        let body = ok(decode(r#"{"current_round":1}"#, IntDecoding::Bigint));
        assert!(matches!(
            SupplyResponse::try_from(&body),
            Err(Error::UnexpectedResponse(msg)) if msg.contains("online-money")
        ));
    }
}
