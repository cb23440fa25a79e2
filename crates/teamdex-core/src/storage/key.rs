//! Key encoding for the roster trees.
//!
//! Integers are stored big-endian so lexicographic key order matches numeric
//! order, which keeps prefix scans sorted by id and slot.

use std::fmt;

/// Size of a row id in bytes.
pub const ID_SIZE: usize = 8;

/// Size of an encoded [`SlotKey`].
pub const SLOT_KEY_SIZE: usize = ID_SIZE + 1;

/// Separator between the two halves of a legality link key.
const LINK_SEPARATOR: u8 = 0;

/// Encode a row id.
pub fn id_key(id: u64) -> [u8; ID_SIZE] {
    id.to_be_bytes()
}

/// Decode a row id.
pub fn decode_id(bytes: &[u8]) -> Option<u64> {
    let buf: [u8; ID_SIZE] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(buf))
}

/// A key addressing the `index`-th child of an owner row.
///
/// Used for roster slots (`team id`, `slot`) and member moves
/// (`member id`, `position`).
///
/// Key format: `[owner (8 bytes, big-endian)][index (1 byte)]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// Owning row id.
    pub owner: u64,
    /// Position under the owner.
    pub index: u8,
}

impl SlotKey {
    /// Create a new slot key.
    pub fn new(owner: u64, index: u8) -> Self {
        Self { owner, index }
    }

    /// Encode the key to bytes.
    pub fn encode(&self) -> [u8; SLOT_KEY_SIZE] {
        let mut buf = [0u8; SLOT_KEY_SIZE];
        buf[..ID_SIZE].copy_from_slice(&self.owner.to_be_bytes());
        buf[ID_SIZE] = self.index;
        buf
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SLOT_KEY_SIZE {
            return None;
        }
        let owner = decode_id(&bytes[..ID_SIZE])?;
        Some(Self {
            owner,
            index: bytes[ID_SIZE],
        })
    }
}

impl fmt::Debug for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotKey({}#{})", self.owner, self.index)
    }
}

/// Key for a legality link: `creature \0 move`.
pub fn link_key(creature: &str, mv: &str) -> Vec<u8> {
    let mut key = link_prefix(creature);
    key.extend_from_slice(mv.as_bytes());
    key
}

/// Prefix for scanning every move a creature may learn.
pub fn link_prefix(creature: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(creature.len() + 1);
    key.extend_from_slice(creature.as_bytes());
    key.push(LINK_SEPARATOR);
    key
}

/// Extract the move name from a link key under `prefix`.
pub fn link_move(key: &[u8], prefix_len: usize) -> Option<String> {
    let tail = key.get(prefix_len..)?;
    String::from_utf8(tail.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_key_roundtrip() {
        let key = SlotKey::new(42, 3);
        let decoded = SlotKey::decode(&key.encode()).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn test_slot_keys_sort_by_owner_then_index() {
        let a = SlotKey::new(1, 5).encode();
        let b = SlotKey::new(2, 0).encode();
        let c = SlotKey::new(2, 1).encode();
        assert!(a < b);
        assert!(b < c);
        assert!(c.starts_with(&id_key(2)));
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(SlotKey::decode(&[0u8; 4]).is_none());
        assert!(decode_id(&[0u8; 9]).is_none());
    }

    #[test]
    fn test_link_prefix_does_not_match_longer_names() {
        let prefix = link_prefix("mew");
        let other = link_key("mewtwo", "psychic");
        assert!(!other.starts_with(&prefix));

        let own = link_key("mew", "psychic");
        assert!(own.starts_with(&prefix));
        assert_eq!(link_move(&own, prefix.len()).as_deref(), Some("psychic"));
    }
}
