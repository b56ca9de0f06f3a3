use cubic_hashes::Hash;
use std::str;

/// Keys a raw transaction record by `(leader_id, raw_tx_id)`: the same transaction
/// content submitted through two leaders is kept as two distinct raw records.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawTxKey {
    encoded: Vec<u8>,
    leader_len: usize,
}

impl RawTxKey {
    pub fn new(leader_id: &str, raw_tx_id: Hash) -> Self {
        let leader_bytes = leader_id.as_bytes();
        let mut encoded = Vec::with_capacity(2 + leader_bytes.len() + 32);
        encoded.extend_from_slice(&(leader_bytes.len() as u16).to_be_bytes());
        encoded.extend_from_slice(leader_bytes);
        encoded.extend_from_slice(raw_tx_id.as_bytes());
        Self { encoded, leader_len: leader_bytes.len() }
    }

    pub fn leader_id(&self) -> &str {
        str::from_utf8(&self.encoded[2..2 + self.leader_len]).expect("leader id is valid utf-8")
    }

    pub fn raw_tx_id(&self) -> Hash {
        Hash::try_from(&self.encoded[2 + self.leader_len..]).expect("trailing 32 bytes form a valid hash")
    }
}

impl AsRef<[u8]> for RawTxKey {
    fn as_ref(&self) -> &[u8] {
        &self.encoded
    }
}

impl TryFrom<&[u8]> for RawTxKey {
    type Error = &'static str;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < 2 {
            return Err("raw tx key too short for length prefix");
        }
        let leader_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        if bytes.len() != 2 + leader_len + 32 {
            return Err("raw tx key length does not match encoded leader length");
        }
        Ok(Self { encoded: bytes.to_vec(), leader_len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_leader_and_raw_tx_id() {
        let hash = Hash::from_bytes([7u8; 32]);
        let key = RawTxKey::new("leader-one", hash);
        assert_eq!(key.leader_id(), "leader-one");
        assert_eq!(key.raw_tx_id(), hash);

        let parsed = RawTxKey::try_from(key.as_ref()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn distinct_leaders_for_the_same_transaction_are_distinct_keys() {
        let hash = Hash::from_bytes([1u8; 32]);
        let key_a = RawTxKey::new("leader-a", hash);
        let key_b = RawTxKey::new("leader-b", hash);
        assert_ne!(key_a, key_b);
    }
}
