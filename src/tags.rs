//! Tag codec.
//!
//! Ledger transactions carry an ordered list of name/value tags. Contract
//! handlers see them folded into a [`TagMap`]: the first occurrence of a name
//! is a single value, later occurrences promote the entry to a list in
//! arrival order. The same fold is used for freshly built drafts and for
//! mined records, so both produce identical maps for identical tags.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// A decoded tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A tag as stored on the ledger: base64url encoded name and value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTag {
    pub name: String,
    pub value: String,
}

impl RawTag {
    /// Encode a text tag for storage on a transaction.
    pub fn encode(name: &str, value: &str) -> Self {
        Self {
            name: URL_SAFE_NO_PAD.encode(name.as_bytes()),
            value: URL_SAFE_NO_PAD.encode(value.as_bytes()),
        }
    }

    pub fn decode_name(&self) -> Option<String> {
        decode_field(&self.name)
    }

    pub fn decode_value(&self) -> Option<String> {
        decode_field(&self.value)
    }

    /// Decode both fields. `None` if either is not valid base64url UTF-8 text.
    pub fn decode(&self) -> Option<Tag> {
        Some(Tag {
            name: self.decode_name()?,
            value: self.decode_value()?,
        })
    }
}

impl From<&Tag> for RawTag {
    fn from(tag: &Tag) -> Self {
        RawTag::encode(&tag.name, &tag.value)
    }
}

fn decode_field(field: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(field).ok()?;
    String::from_utf8(bytes).ok()
}

/// Value of a [`TagMap`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Single(String),
    Multi(Vec<String>),
}

impl TagValue {
    /// First value seen for this name.
    pub fn first(&self) -> &str {
        match self {
            TagValue::Single(v) => v,
            // Multi is only created from a Single plus one more value
            TagValue::Multi(vs) => vs.first().map(String::as_str).unwrap_or_default(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            TagValue::Single(v) => vec![v.as_str()],
            TagValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            TagValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = TagValue::Multi(vec![first, value]);
            }
            TagValue::Multi(vs) => vs.push(value),
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagValue::Single(v) => serializer.serialize_str(v),
            TagValue::Multi(vs) => {
                let mut seq = serializer.serialize_seq(Some(vs.len()))?;
                for v in vs {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

/// Tag name to value(s), keyed in first-arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, TagValue)>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// First value recorded under `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(TagValue::first)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, TagValue::Single(value))),
        }
    }
}

impl FromIterator<Tag> for TagMap {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        iter.into_iter().fold(TagMap::new(), |mut map, tag| {
            map.insert(tag.name, tag.value);
            map
        })
    }
}

impl Serialize for TagMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Fold ledger-stored tags into a [`TagMap`], skipping undecodable entries.
pub fn decode_tags(raw: &[RawTag]) -> TagMap {
    raw.iter()
        .filter_map(|tag| {
            let decoded = tag.decode();
            if decoded.is_none() {
                tracing::trace!(name = %tag.name, "skipping tag with invalid utf-8 name or value");
            }
            decoded
        })
        .collect()
}

/// First decodable value stored under `name`.
pub fn find_tag_value(raw: &[RawTag], name: &str) -> Option<String> {
    raw.iter()
        .filter(|tag| tag.decode_name().as_deref() == Some(name))
        .find_map(RawTag::decode_value)
}

/// Fold already-decoded tags into a [`TagMap`].
pub fn format_tags(tags: &[Tag]) -> TagMap {
    tags.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, value: &str) -> RawTag {
        RawTag::encode(name, value)
    }

    fn invalid_utf8() -> String {
        URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd])
    }

    #[test]
    fn test_duplicate_names_become_ordered_list() {
        let tags = vec![raw("a", "1"), raw("b", "2"), raw("a", "3")];
        let map = decode_tags(&tags);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("a"),
            Some(&TagValue::Multi(vec!["1".into(), "3".into()]))
        );
        assert_eq!(map.get("b"), Some(&TagValue::Single("2".into())));
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"a":["1","3"],"b":"2"}"#
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let tags = vec![raw("x", "1"), raw("y", "2"), raw("x", "3"), raw("x", "4")];
        assert_eq!(decode_tags(&tags), decode_tags(&tags));
        assert_eq!(decode_tags(&tags).get("x").unwrap().values(), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_undecodable_tag_is_dropped() {
        let tags = vec![
            raw("a", "1"),
            RawTag {
                name: invalid_utf8(),
                value: URL_SAFE_NO_PAD.encode("v"),
            },
            raw("b", "2"),
            RawTag {
                name: URL_SAFE_NO_PAD.encode("c"),
                value: "not base64!".into(),
            },
        ];
        let map = decode_tags(&tags);

        assert_eq!(map.len(), 2);
        assert_eq!(map.first("a"), Some("1"));
        assert_eq!(map.first("b"), Some("2"));
        assert!(map.get("c").is_none());
    }

    #[test]
    fn test_find_tag_value_skips_bad_matches() {
        let tags = vec![
            RawTag {
                name: URL_SAFE_NO_PAD.encode("Input"),
                value: invalid_utf8(),
            },
            raw("Input", "{\"f\":1}"),
            raw("Input", "second"),
        ];
        assert_eq!(find_tag_value(&tags, "Input").as_deref(), Some("{\"f\":1}"));
        assert_eq!(find_tag_value(&tags, "Missing"), None);
    }

    #[test]
    fn test_find_tag_value_all_matches_bad() {
        let tags = vec![RawTag {
            name: URL_SAFE_NO_PAD.encode("Contract"),
            value: invalid_utf8(),
        }];
        assert_eq!(find_tag_value(&tags, "Contract"), None);
    }

    #[test]
    fn test_format_tags_matches_decode_tags() {
        let plain = vec![Tag::new("App-Name", "x"), Tag::new("k", "1"), Tag::new("k", "2")];
        let encoded: Vec<RawTag> = plain.iter().map(RawTag::from).collect();
        assert_eq!(format_tags(&plain), decode_tags(&encoded));
    }
}
