//! Opaque identifiers
//!
//! Server ids handed to API consumers pack the three admin-ajax parameters
//! (`id`, `i`, `q`) into a single string, concealed with a shift cipher so
//! that the raw upstream parameters never appear in our URLs. This is
//! obfuscation, not security.
//!
//! The cipher rotates by [`SHIFT`] positions inside two rings:
//! digits and upper-case letters (`0-9A-Z`), and lower-case letters
//! (`a-z`). Only these characters and the [`DELIMITER`] may appear in an
//! opaque id, so ids are always safe as a URL path segment.
//!
//! The same transform conceals the upstream action names
//! ([`NONCE_ACTION`], [`EMBED_ACTION`]).

use crate::error::{Error, Result};
use std::fmt;

const SHIFT: usize = 5;
const UPPER_RING: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER_RING: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Separator between the components of a server id
pub const DELIMITER: char = '-';

/// admin-ajax action issuing a nonce (concealed)
pub const NONCE_ACTION: &str = "ff675Di7Ck7Ehf895hE7hBBi6E7Bk68k";

/// admin-ajax action returning the embed fragment of a mirror (concealed)
pub const EMBED_ACTION: &str = "7f8A5AhE8g558Ai8k9AAikD7gkECBgD9";

fn ring_of(c: char) -> Option<(&'static [u8], usize)> {
    let b = u8::try_from(c).ok()?;
    if let Some(pos) = UPPER_RING.iter().position(|&x| x == b) {
        return Some((UPPER_RING, pos));
    }
    LOWER_RING
        .iter()
        .position(|&x| x == b)
        .map(|pos| (LOWER_RING, pos))
}

fn rotate(input: &str, forward: bool) -> String {
    input
        .chars()
        .map(|c| match ring_of(c) {
            Some((ring, pos)) => {
                let len = ring.len();
                let shifted = if forward {
                    (pos + SHIFT) % len
                } else {
                    (pos + len - SHIFT % len) % len
                };
                ring[shifted] as char
            }
            None => c,
        })
        .collect()
}

/// Shifts every alphanumeric character forward; other characters are kept
pub fn conceal(input: &str) -> String {
    rotate(input, true)
}

/// Inverse of [`conceal`]
pub fn reveal(input: &str) -> String {
    rotate(input, false)
}

/// The three admin-ajax parameters identifying one mirror
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerTriple {
    /// Post id of the episode (`id`)
    pub media_id: String,
    /// Mirror index inside the quality (`i`)
    pub instance_index: String,
    /// Quality label (`q`)
    pub quality_index: String,
}

impl ServerTriple {
    /// Builds a triple, rejecting components the codec cannot carry
    ///
    /// `media_id` and `instance_index` are the numbers of the mirror
    /// payload and must be ASCII digits. `quality_index` is a non-empty run
    /// of ASCII letters and digits.
    pub fn new(
        media_id: impl Into<String>,
        instance_index: impl Into<String>,
        quality_index: impl Into<String>,
    ) -> Result<Self> {
        let triple = Self {
            media_id: media_id.into(),
            instance_index: instance_index.into(),
            quality_index: quality_index.into(),
        };

        let checks = [
            (&triple.media_id, is_number as fn(&str) -> bool),
            (&triple.instance_index, is_number),
            (&triple.quality_index, is_label),
        ];
        for (part, valid) in checks {
            if !valid(part) {
                return Err(Error::malformed_id(format!(
                    "invalid server id component {:?}",
                    part
                )));
            }
        }

        Ok(triple)
    }
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

fn is_label(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Externally visible server id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueServerId(String);

impl OpaqueServerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OpaqueServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OpaqueServerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Packs a triple into an opaque id
pub fn encode(triple: &ServerTriple) -> OpaqueServerId {
    let joined = format!(
        "{}{d}{}{d}{}",
        triple.media_id,
        triple.instance_index,
        triple.quality_index,
        d = DELIMITER
    );
    OpaqueServerId(conceal(&joined))
}

/// Unpacks an opaque id produced by [`encode`]
///
/// Fails with [`Error::MalformedId`] on foreign characters, when the
/// revealed text does not split into exactly three components, or when a
/// component does not have the shape [`ServerTriple::new`] requires. An
/// unconcealed triple such as `155468-0-720p` is rejected: its numbers
/// reveal to letters.
pub fn decode(id: &str) -> Result<ServerTriple> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c == DELIMITER || c.is_ascii_alphanumeric())
    {
        return Err(Error::malformed_id(id));
    }

    let revealed = reveal(id);
    let parts: Vec<&str> = revealed.split(DELIMITER).collect();

    match parts.as_slice() {
        [media_id, instance_index, quality_index] => {
            ServerTriple::new(*media_id, *instance_index, *quality_index)
                .map_err(|_| Error::malformed_id(id))
        }
        _ => Err(Error::malformed_id(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_reveal_to_hex_digests() {
        assert_eq!(reveal(NONCE_ACTION), "aa1208d27f29ca340c92c66d1926f13f");
        assert_eq!(reveal(EMBED_ACTION), "2a3505c93b0035d3f455df82bf976b84");
        assert_eq!(conceal(&reveal(NONCE_ACTION)), NONCE_ACTION);
    }

    #[test]
    fn test_rings_wrap_around() {
        assert_eq!(conceal("Z"), "4");
        assert_eq!(conceal("z"), "e");
        assert_eq!(reveal("4"), "Z");
        assert_eq!(reveal("e"), "z");
        assert_eq!(conceal("a-b_c"), "f-g_h");
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let samples = [
            ("155468", "0", "720p"),
            ("1", "12", "360p"),
            ("7", "9", "HD"),
            ("99999", "4", "1080p"),
        ];

        for (id, i, q) in samples {
            let triple = ServerTriple::new(id, i, q).unwrap();
            let encoded = encode(&triple);
            assert!(encoded
                .as_str()
                .chars()
                .all(|c| c == DELIMITER || c.is_ascii_alphanumeric()));
            assert_eq!(decode(encoded.as_str()).unwrap(), triple);
        }
    }

    #[test]
    fn test_encoding_hides_the_raw_parameters() {
        let triple = ServerTriple::new("155468", "0", "720p").unwrap();
        let encoded = encode(&triple);
        assert_eq!(encoded.as_str(), "6AA9BD-5-C75u");
        assert!(!encoded.as_str().contains("155468"));
    }

    #[test]
    fn test_decode_rejects_wrong_component_count() {
        // "hello" reveals to a single component
        assert!(matches!(decode("hello"), Err(Error::MalformedId(_))));
        // four components
        let four = conceal("1-2-3-4");
        assert!(matches!(decode(&four), Err(Error::MalformedId(_))));
        // empty component
        let hole = conceal("1--3");
        assert!(matches!(decode(&hole), Err(Error::MalformedId(_))));
    }

    #[test]
    fn test_decode_rejects_text_encode_did_not_produce() {
        assert!(matches!(decode("155468-0-720p"), Err(Error::MalformedId(_))));
        assert!(matches!(decode("not-an-id"), Err(Error::MalformedId(_))));
        assert!(matches!(decode("a-b-c"), Err(Error::MalformedId(_))));
        // numbers in the wrong slot
        let swapped = conceal("720p-0-155468");
        assert!(matches!(decode(&swapped), Err(Error::MalformedId(_))));
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(matches!(decode(""), Err(Error::MalformedId(_))));
        assert!(matches!(decode("6AA9BD-5-C75u/"), Err(Error::MalformedId(_))));
        assert!(matches!(decode("6A A9-5-C"), Err(Error::MalformedId(_))));
        assert!(matches!(decode("é-5-6"), Err(Error::MalformedId(_))));
    }

    #[test]
    fn test_triple_rejects_delimiter_and_empty_components() {
        assert!(ServerTriple::new("1-2", "0", "720p").is_err());
        assert!(ServerTriple::new("", "0", "720p").is_err());
        assert!(ServerTriple::new("1", "0", "7 20p").is_err());
        assert!(ServerTriple::new("W00Z13", "0", "720p").is_err());
        assert!(ServerTriple::new("155468", "V", "720p").is_err());
    }
}
