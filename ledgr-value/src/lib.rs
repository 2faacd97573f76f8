use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

mod render;

/// Insertion-ordered object map. Order is kept so a rendered tree reads like the wire text.
pub type ObjectMap = indexmap::IndexMap<Arc<str>, Value, ahash::RandomState>;

/// Largest integer an `f64` holds exactly (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// A decoded response body.
///
/// Integers land in either [`Value::Number`] or [`Value::BigInt`] depending on the decoding
/// policy that produced the tree; the tree itself carries no policy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    String(Arc<str>),
    BigInt(BigInt),
    /// Always finite.
    Number(f64),
    Array(Vec<Value>),
    Object(ObjectMap),
}

impl Value {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<Arc<str>>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Self::BigInt(v) => Some(v),
            _ => None,
        }
    }

    /// Integer view of either numeric representation.
    ///
    /// `Number` only converts when it is integral and within the safe range, so a lossy
    /// approximation never masquerades as an exact integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::BigInt(v) => i64::try_from(v).ok(),
            Self::Number(v) if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER as f64 => {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    /// Exact integer view; same rules as [`Value::as_i64`] without the `i64` bound on bigints.
    #[must_use]
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Self::BigInt(v) => Some(v.clone()),
            Self::Number(_) => self.as_i64().map(BigInt::from),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Object member lookup. `None` for non-objects and missing keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::BigInt(_) => "bigint",
            Self::Number(_) => "number",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Self::BigInt(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<ObjectMap> for Value {
    fn from(v: ObjectMap) -> Self {
        Self::Object(v)
    }
}

/// Renders the tree as JSON text. `{:#}` pretty-prints with two-space indentation.
///
/// Bigints are written as bare integer literals, so the output only keeps full precision for
/// readers that decode integers the same way.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_value(f, self, f.alternate().then_some(0))
    }
}
