use std::hash::{BuildHasher, Hash};

use bytes::{Bytes, BytesMut};
use indexmap::IndexMap;

/// `true` iff both slices have the same length and every index-aligned pair is equal.
pub fn sequence_equal<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| x == y)
}

/// Join byte sequences into one contiguous buffer, in order.
pub fn concat_sequences<B: AsRef<[u8]>>(parts: &[B]) -> Bytes {
    let total = parts.iter().map(|p| p.as_ref().len()).sum();
    let mut out = BytesMut::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out.freeze()
}

/// Shallow copy of `map` without the keys whose value is absent (`None`).
///
/// Present values are kept whatever they hold, including null, zero, `false` and empty text.
pub fn prune_absent_keys<K, V, S>(map: &IndexMap<K, Option<V>, S>) -> IndexMap<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    map.iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect()
}

/// `true` when called from inside a Tokio runtime.
///
/// The client uses this to decide whether a blocking call may spin up its own runtime.
pub fn is_hosted_runtime() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}
