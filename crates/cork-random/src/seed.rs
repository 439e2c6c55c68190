use std::fmt;
use std::sync::Arc;

use cork_types::CorkError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Stable across processes and toolchains, which
/// `std::collections::hash_map::DefaultHasher` does not promise.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// A single heterogeneous seed input.
#[derive(Clone)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<SeedValue>),
    Map(Vec<(SeedValue, SeedValue)>),
    /// Anything else that can describe itself as text.
    Display(Arc<dyn fmt::Display + Send + Sync>),
}

impl SeedValue {
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<SeedValue>,
        V: Into<SeedValue>,
    {
        SeedValue::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn display(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        SeedValue::Display(Arc::new(value))
    }

    /// Quoted form used for elements nested inside lists and maps.
    fn write_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Str(s) => write!(f, "'{}'", s.escape_default()),
            other => fmt::Display::fmt(other, f),
        }
    }
}

/// Canonical string form. Containers render like literals (`['foo', 187]`,
/// `{'key': 90210}`); a top-level string renders as itself.
impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Null => f.write_str("None"),
            SeedValue::Bool(true) => f.write_str("True"),
            SeedValue::Bool(false) => f.write_str("False"),
            SeedValue::Int(i) => write!(f, "{i}"),
            SeedValue::UInt(u) => write!(f, "{u}"),
            SeedValue::Float(x) => write!(f, "{x:?}"),
            SeedValue::Str(s) => f.write_str(s),
            SeedValue::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            SeedValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_repr(f)?;
                }
                f.write_str("]")
            }
            SeedValue::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_repr(f)?;
                    f.write_str(": ")?;
                    v.write_repr(f)?;
                }
                f.write_str("}")
            }
            SeedValue::Display(d) => fmt::Display::fmt(&**d, f),
        }
    }
}

impl fmt::Debug for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Display(_) => f.write_str("Display(..)"),
            other => write!(f, "SeedValue({other})"),
        }
    }
}

/// Something that can contribute a stable integer to a composite seed.
pub trait SeedHash: fmt::Display {
    /// Hash defined directly on the value, if there is one.
    fn intrinsic_hash(&self) -> Option<u64>;

    /// Intrinsic hash, falling back to the FNV-1a hash of the canonical
    /// string form.
    fn seed_hash(&self) -> Result<u64, CorkError> {
        if let Some(h) = self.intrinsic_hash() {
            return Ok(h);
        }
        let mut canonical = String::new();
        fmt::write(&mut canonical, format_args!("{self}")).map_err(|_| {
            CorkError::UnhashableSeed("no intrinsic hash and no string form".to_string())
        })?;
        Ok(fnv1a(canonical.as_bytes()))
    }
}

impl SeedHash for SeedValue {
    fn intrinsic_hash(&self) -> Option<u64> {
        match self {
            SeedValue::Null => Some(fnv1a(b"None")),
            SeedValue::Bool(b) => Some(u64::from(*b)),
            SeedValue::Int(i) => Some(*i as u64),
            SeedValue::UInt(u) => Some(*u),
            SeedValue::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
                    // Integral floats hash like the equal integer.
                    Some(*x as i64 as u64)
                } else {
                    Some(x.to_bits())
                }
            }
            SeedValue::Str(s) => Some(fnv1a(s.as_bytes())),
            SeedValue::Bytes(b) => Some(fnv1a(b)),
            SeedValue::List(_) | SeedValue::Map(_) | SeedValue::Display(_) => None,
        }
    }
}

/// Fold the hashes of `inputs` left to right with XOR.
///
/// Returns `Ok(None)` for an empty slice, which callers treat as "seed from
/// entropy".
pub fn combine_seed(inputs: &[SeedValue]) -> Result<Option<u64>, CorkError> {
    if inputs.is_empty() {
        return Ok(None);
    }
    let mut seed = 0u64;
    for (i, input) in inputs.iter().enumerate() {
        let h = input.seed_hash().map_err(|e| match e {
            CorkError::UnhashableSeed(why) => CorkError::UnhashableSeed(format!("input {i}: {why}")),
            other => other,
        })?;
        seed ^= h;
    }
    Ok(Some(seed))
}

macro_rules! from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(impl From<$t> for SeedValue {
            fn from(v: $t) -> Self {
                SeedValue::$variant(v as $target)
            }
        })+
    };
}

from_int!(Int, i64, i8, i16, i32, i64, isize);
from_int!(UInt, u64, u8, u16, u32, u64, usize);

impl From<f64> for SeedValue {
    fn from(v: f64) -> Self {
        SeedValue::Float(v)
    }
}

impl From<bool> for SeedValue {
    fn from(v: bool) -> Self {
        SeedValue::Bool(v)
    }
}

impl From<&str> for SeedValue {
    fn from(v: &str) -> Self {
        SeedValue::Str(v.to_string())
    }
}

impl From<String> for SeedValue {
    fn from(v: String) -> Self {
        SeedValue::Str(v)
    }
}

impl From<()> for SeedValue {
    fn from(_: ()) -> Self {
        SeedValue::Null
    }
}

impl<T: Into<SeedValue>> From<Option<T>> for SeedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SeedValue::Null, Into::into)
    }
}

impl<T: Into<SeedValue>> From<Vec<T>> for SeedValue {
    fn from(v: Vec<T>) -> Self {
        SeedValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Build a `Vec<SeedValue>` from heterogeneous expressions.
///
/// ```
/// use cork_random::{seeds, SeedValue};
/// let inputs = seeds!["*args", 2, SeedValue::map([("key", 90210)])];
/// assert_eq!(inputs.len(), 3);
/// ```
#[macro_export]
macro_rules! seeds {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::SeedValue::from($v)),*]
    };
}
