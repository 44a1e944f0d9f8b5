use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A hybrid logical clock timestamp: `(wall, logical, node)`.
///
/// Total order is lexicographic over the three fields in that order, which
/// is exactly what `#[derive(Ord)]` gives for a struct with fields declared
/// in this order — there is no separate `compare` entry point, `Ord`/`Cmp`
/// *is* the compare function.
///
/// `node` is stored as `Arc<str>` rather than `String` because a single
/// `Hlc` is cloned once per tagged field in a [`Change`]'s `tags` map; the
/// node id is typically shared across an entire process's lifetime.
///
/// [`Change`]: https://docs.rs/rippledb-types
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hlc {
    pub wall: u64,
    pub logical: u32,
    pub node: Arc<str>,
}

impl Hlc {
    /// Constructs an `Hlc` directly. Most callers should go through
    /// [`HlcClock::tick`](crate::HlcClock::tick) instead; this is exposed
    /// for adapters that need to round-trip a wire value.
    pub fn new(wall: u64, logical: u32, node: impl Into<Arc<str>>) -> Self {
        Self {
            wall,
            logical,
            node: node.into(),
        }
    }
}

impl fmt::Display for Hlc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.wall, self.logical, self.node)
    }
}

/// Error returned when parsing the `"<wall>:<logical>:<node>"` wire form fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hlc string {0:?}")]
pub struct HlcParseError(pub String);

impl FromStr for Hlc {
    type Err = HlcParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(wall), Some(logical), Some(node)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(HlcParseError(s.to_owned()));
        };
        let wall: u64 = wall.parse().map_err(|_| HlcParseError(s.to_owned()))?;
        let logical: u32 = logical.parse().map_err(|_| HlcParseError(s.to_owned()))?;
        if node.is_empty() {
            return Err(HlcParseError(s.to_owned()));
        }
        Ok(Hlc::new(wall, logical, node))
    }
}

/// Serializes `Hlc` as the canonical `"<wall>:<logical>:<node>"` string form
/// (spec §9: an implementation must accept both wire forms on ingest but
/// emit one consistently — this picks the string form).
impl Serialize for Hlc {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserializes `Hlc` from either the string form or the structured
/// `{wall, logical, node}` object form.
impl<'de> Deserialize<'de> for Hlc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(HlcVisitor)
    }
}

struct HlcVisitor;

impl<'de> Visitor<'de> for HlcVisitor {
    type Value = Hlc;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an hlc string \"wall:logical:node\" or an object {wall, logical, node}")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse().map_err(de::Error::custom)
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        self.visit_str(&v)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "snake_case")]
        enum Field {
            Wall,
            Logical,
            Node,
        }

        let mut wall: Option<u64> = None;
        let mut logical: Option<u32> = None;
        let mut node: Option<String> = None;

        while let Some(key) = map.next_key::<Field>()? {
            match key {
                Field::Wall => wall = Some(map.next_value()?),
                Field::Logical => logical = Some(map.next_value()?),
                Field::Node => node = Some(map.next_value()?),
            }
        }

        let wall = wall.ok_or_else(|| de::Error::missing_field("wall"))?;
        let logical = logical.ok_or_else(|| de::Error::missing_field("logical"))?;
        let node = node.ok_or_else(|| de::Error::missing_field("node"))?;
        Ok(Hlc::new(wall, logical, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_is_wall_then_logical_then_node() {
        let a = Hlc::new(1000, 0, "a");
        let b = Hlc::new(1000, 0, "b");
        let c = Hlc::new(1000, 1, "a");
        let d = Hlc::new(1001, 0, "a");
        assert!(a < b, "same wall/logical: node breaks the tie");
        assert!(b < c, "same wall: logical breaks the tie");
        assert!(c < d, "wall dominates logical");
    }

    #[test]
    fn display_and_parse_round_trip() {
        let h = Hlc::new(1000, 7, "node-a");
        let s = h.to_string();
        assert_eq!(s, "1000:7:node-a");
        assert_eq!(s.parse::<Hlc>().unwrap(), h);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("not-an-hlc".parse::<Hlc>().is_err());
        assert!("1000:abc:node".parse::<Hlc>().is_err());
        assert!("1000:0:".parse::<Hlc>().is_err());
    }

    #[test]
    fn serializes_to_string_form() {
        let h = Hlc::new(1000, 7, "node-a");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "\"1000:7:node-a\"");
    }

    #[test]
    fn deserializes_both_wire_forms() {
        let from_string: Hlc = serde_json::from_str("\"1000:7:node-a\"").unwrap();
        let from_object: Hlc =
            serde_json::from_str(r#"{"wall":1000,"logical":7,"node":"node-a"}"#).unwrap();
        assert_eq!(from_string, from_object);
        assert_eq!(from_string, Hlc::new(1000, 7, "node-a"));
    }
}
