use crate::types::KeyType;
use redb::TypeName;
use std::cmp::Ordering;
use std::fmt;
use std::str;

/// Natural key of a search key record: `(key_type, display_text)`.
///
/// Encoded as a one-byte type tag followed by the UTF-8 display text, ordered
/// by type first and text second.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId {
    pub key_type: KeyType,
    pub display_text: String,
}

impl KeyId {
    pub fn new(display_text: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            key_type,
            display_text: display_text.into(),
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key_type, self.display_text)
    }
}

fn split_tag(data: &[u8]) -> (u8, &[u8]) {
    let (tag, text) = data.split_first().expect("empty key id");
    (*tag, text)
}

impl redb::Key for KeyId {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        let (tag1, text1) = split_tag(data1);
        let (tag2, text2) = split_tag(data2);

        tag1.cmp(&tag2).then_with(|| {
            let s1 = str::from_utf8(text1).expect("invalid UTF-8 in key id");
            let s2 = str::from_utf8(text2).expect("invalid UTF-8 in key id");
            s1.cmp(s2)
        })
    }
}

impl redb::Value for KeyId {
    type SelfType<'a> = KeyId;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (tag, text) = split_tag(data);
        let key_type = KeyType::from_tag(tag).expect("unknown key type tag");
        let display_text = str::from_utf8(text).expect("invalid UTF-8 in key id");

        KeyId::new(display_text, key_type)
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        let mut bytes = Vec::with_capacity(1 + value.display_text.len());
        bytes.push(value.key_type.tag());
        bytes.extend_from_slice(value.display_text.as_bytes());
        bytes
    }

    fn type_name() -> TypeName {
        TypeName::new("marquee::KeyId")
    }
}
