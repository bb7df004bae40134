//! Sort keys for items within a lane using fractional indexing.

use crate::error::{ReorderError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE: u32 = 36;

/// Width of keys produced by [`Ordinal::dense`].
const DENSE_WIDTH: u32 = 5;
/// Dense keys never use the `0` digit, so the radix is one less than [`BASE`].
const DENSE_RADIX: u64 = 35;

/// Rank of an item within its lane. Uses fractional indexing.
///
/// An ordinal is a non-empty string over `0-9a-z` read as a base-36 fraction
/// (`"i"` is one half). Lexicographic order is display order, and a new key
/// can always be minted between two valid keys, so moving one item never
/// forces a rewrite of its neighbours. Valid keys never end in `0`; that keeps
/// every fraction to a single spelling and guarantees room between any two.
///
/// Keys read from a store are accepted as-is and only validated when used as
/// bounds. A lane holding an invalid key gets compacted on its next write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ordinal(String);

impl Ordinal {
    /// Key for the first item of an empty lane
    pub fn first() -> Self {
        Self(bytes_to_string(midpoint(&[], None)))
    }

    /// Key after all existing keys
    pub fn after(last: &Ordinal) -> Result<Self> {
        Self::between(Some(last), None)
    }

    /// Key before all existing keys
    pub fn before(first: &Ordinal) -> Result<Self> {
        Self::between(None, Some(first))
    }

    /// Key strictly between two bounds. `None` means open-ended on that side.
    pub fn between(before: Option<&Ordinal>, after: Option<&Ordinal>) -> Result<Self> {
        for bound in [before, after].into_iter().flatten() {
            bound.validate()?;
        }
        if let (Some(b), Some(a)) = (before, after) {
            if b >= a {
                return Err(ReorderError::InvalidRank {
                    rank: b.0.clone(),
                    message: format!("lower bound is not below '{}'", a.0),
                });
            }
        }

        let lower = before.map(|o| o.0.as_bytes()).unwrap_or(&[]);
        let upper = after.map(|o| o.0.as_bytes());
        Ok(Self(bytes_to_string(midpoint(lower, upper))))
    }

    /// Fixed-width key whose order matches integer order of `index`.
    ///
    /// Used by the dense strategy, where the stored rank mirrors the item's
    /// position column. Keys skip the `0` digit so they stay valid bounds for
    /// [`Ordinal::between`] if the board later switches to sparse ranking.
    pub fn dense(index: usize) -> Self {
        let capacity = DENSE_RADIX.pow(DENSE_WIDTH);
        debug_assert!((index as u64) < capacity, "dense index {index} exceeds key width");
        let mut value = (index as u64).min(capacity - 1);

        let mut out = vec![b'1'; DENSE_WIDTH as usize];
        for slot in out.iter_mut().rev() {
            *slot = DIGITS[(value % DENSE_RADIX) as usize + 1];
            value /= DENSE_RADIX;
        }
        Self(bytes_to_string(out))
    }

    /// `count` evenly spaced keys in ascending order, as short as possible.
    pub fn spread(count: usize) -> Vec<Self> {
        if count == 0 {
            return Vec::new();
        }

        let slots = count as u128 + 1;
        let mut width = 1u32;
        let mut modulus = BASE as u128;
        while modulus < slots {
            width += 1;
            modulus *= BASE as u128;
        }

        (1..=count as u128)
            .map(|i| {
                let value = i * modulus / slots;
                let mut digits = vec![b'0'; width as usize];
                let mut rest = value;
                for slot in digits.iter_mut().rev() {
                    *slot = DIGITS[(rest % BASE as u128) as usize];
                    rest /= BASE as u128;
                }
                while digits.last() == Some(&b'0') {
                    digits.pop();
                }
                Self(bytes_to_string(digits))
            })
            .collect()
    }

    /// Wrap a string without validation (store input)
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Parse and validate a key
    pub fn parse(s: &str) -> Result<Self> {
        let ordinal = Self(s.to_string());
        ordinal.validate()?;
        Ok(ordinal)
    }

    /// Whether this key can serve as a bound for [`Ordinal::between`]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| ReorderError::InvalidRank {
            rank: self.0.clone(),
            message: message.to_string(),
        };
        if self.0.is_empty() {
            return Err(invalid("empty"));
        }
        if !self.0.bytes().all(|b| digit_value(b).is_some()) {
            return Err(invalid("characters outside 0-9a-z"));
        }
        if self.0.ends_with('0') {
            return Err(invalid("trailing zero"));
        }
        Ok(())
    }

    /// Length of the key in characters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty (only possible for unvalidated store input)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialOrd for Ordinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ordinal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Default for Ordinal {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'z' => Some((b - b'a') as u32 + 10),
        _ => None,
    }
}

/// Midpoint of two digit strings, `lower < upper`, neither ending in `0`.
/// An empty `lower` is zero and a missing `upper` is one.
fn midpoint(lower: &[u8], upper: Option<&[u8]>) -> Vec<u8> {
    if let Some(upper) = upper {
        let mut n = 0;
        while n < upper.len() && lower.get(n).copied().unwrap_or(b'0') == upper[n] {
            n += 1;
        }
        if n > 0 {
            let mut out = upper[..n].to_vec();
            out.extend(midpoint(lower.get(n..).unwrap_or(&[]), Some(&upper[n..])));
            return out;
        }
    }

    let lo = lower.first().and_then(|&b| digit_value(b)).unwrap_or(0);
    let hi = upper
        .and_then(|u| u.first())
        .and_then(|&b| digit_value(b))
        .unwrap_or(BASE);

    if hi - lo > 1 {
        vec![DIGITS[((lo + hi + 1) / 2) as usize]]
    } else if let Some(upper) = upper.filter(|u| u.len() > 1) {
        vec![upper[0]]
    } else {
        let mut out = vec![DIGITS[lo as usize]];
        out.extend(midpoint(lower.get(1..).unwrap_or(&[]), None));
        out
    }
}

fn bytes_to_string(bytes: Vec<u8>) -> String {
    // Only ever built from DIGITS.
    bytes.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ord(s: &str) -> Ordinal {
        Ordinal::parse(s).unwrap()
    }

    #[test]
    fn test_ordinal_first() {
        assert_eq!(Ordinal::first().as_str(), "i");
    }

    #[test]
    fn test_ordinal_after() {
        let first = Ordinal::first();
        let second = Ordinal::after(&first).unwrap();
        assert!(second > first);

        let third = Ordinal::after(&second).unwrap();
        assert!(third > second);

        let mut last = ord("z");
        for _ in 0..50 {
            let next = Ordinal::after(&last).unwrap();
            assert!(next > last, "{next} should sort after {last}");
            last = next;
        }
    }

    #[test]
    fn test_ordinal_before() {
        let mut first = Ordinal::first();
        for _ in 0..50 {
            let prev = Ordinal::before(&first).unwrap();
            assert!(prev < first, "{prev} should sort before {first}");
            assert!(prev.is_valid());
            first = prev;
        }
    }

    #[test]
    fn test_ordinal_between() {
        let mid = Ordinal::between(Some(&ord("a1")), Some(&ord("a3"))).unwrap();
        assert_eq!(mid.as_str(), "a2");

        let tight = Ordinal::between(Some(&ord("a1")), Some(&ord("a2"))).unwrap();
        assert!(tight > ord("a1") && tight < ord("a2"));
        assert!(tight.is_valid());

        let prefix = Ordinal::between(Some(&ord("a")), Some(&ord("a01"))).unwrap();
        assert!(prefix > ord("a") && prefix < ord("a01"));
    }

    #[test]
    fn test_repeated_bisection_stays_ordered() {
        let low = ord("1");
        let mut high = ord("2");
        for _ in 0..40 {
            let mid = Ordinal::between(Some(&low), Some(&high)).unwrap();
            assert!(mid > low && mid < high);
            high = mid;
        }
    }

    #[test]
    fn test_between_rejects_bad_bounds() {
        assert!(Ordinal::between(Some(&ord("b")), Some(&ord("a"))).is_err());
        assert!(Ordinal::between(Some(&ord("b")), Some(&ord("b"))).is_err());
        let legacy = Ordinal::from_string("10");
        assert!(Ordinal::after(&legacy).is_err());
    }

    #[test]
    fn test_parse_validation() {
        assert!(Ordinal::parse("").is_err());
        assert!(Ordinal::parse("A").is_err());
        assert!(Ordinal::parse("a0").is_err());
        assert!(Ordinal::parse("a01").is_ok());
    }

    #[test]
    fn test_dense_keys_follow_integer_order() {
        let keys: Vec<_> = (0..2000).map(Ordinal::dense).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.iter().all(|k| k.is_valid()));
        assert_eq!(keys[0].as_str(), "11111");
    }

    #[test]
    fn test_spread_is_ascending_and_short() {
        let keys = Ordinal::spread(5);
        assert_eq!(keys.len(), 5);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(keys.iter().all(|k| k.len() == 1 && k.is_valid()));

        let many = Ordinal::spread(500);
        assert!(many.windows(2).all(|w| w[0] < w[1]));
        assert!(many.iter().all(|k| k.len() <= 2 && k.is_valid()));

        assert!(Ordinal::spread(0).is_empty());
    }
}
