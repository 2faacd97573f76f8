/// How integer literals in a response body are represented after decoding.
///
/// The policy is passed to every decode call; there is no process-wide default to mutate.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IntDecoding {
    /// Every integer becomes a `Number`. Values beyond `MAX_SAFE_INTEGER` lose precision.
    #[default]
    Default,

    /// Every integer becomes a `Number`; values beyond `MAX_SAFE_INTEGER` fail the decode.
    Safe,

    /// Safe-range integers become `Number`, larger magnitudes become `BigInt`.
    Mixed,

    /// Every integer becomes a `BigInt`, including small ones.
    Bigint,
}

impl IntDecoding {
    /// Accepted names, for help text and error messages.
    pub fn names() -> &'static [&'static str] {
        <Self as strum::VariantNames>::VARIANTS
    }
}

/// Parse a policy name the way CLI and config input spell it.
pub fn parse_int_decoding(s: &str) -> Result<IntDecoding, String> {
    let s = s.trim();
    s.parse().map_err(|_| {
        format!(
            "unsupported int decoding '{s}'. Available policies: {}",
            IntDecoding::names().join(", ")
        )
    })
}
