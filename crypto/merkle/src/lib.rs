use cubic_hashes::{content_hash, Hash};

/// Combines a round of leaves into the next round, pairing consecutive entries and
/// duplicating the last entry when the round is odd-sized.
pub fn merkle_root(leaves: impl ExactSizeIterator<Item = Hash>) -> Hash {
    let mut round: Vec<Hash> = leaves.collect();
    if round.is_empty() {
        return Hash::ZERO;
    }
    while round.len() > 1 {
        if round.len() % 2 == 1 {
            let last = *round.last().unwrap();
            round.push(last);
        }
        round = round.chunks_exact(2).map(|pair| merkle_hash(pair[0], pair[1])).collect();
    }
    round.into_iter().next().unwrap()
}

/// Combines two hashes by hashing their concatenation.
pub fn merkle_hash(left: Hash, right: Hash) -> Hash {
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(left.as_bytes());
    bytes.extend_from_slice(right.as_bytes());
    content_hash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(data: &[u8]) -> Hash {
        content_hash(data)
    }

    #[test]
    fn empty_returns_zero_hash() {
        let root = merkle_root(std::iter::empty());
        assert_eq!(root, Hash::ZERO);
    }

    #[test]
    fn single_entry_returns_the_entry_itself() {
        let entry = make_hash(b"single");
        let root = merkle_root(std::iter::once(entry));
        assert_eq!(root, entry, "a single leaf is its own root, with no self-pairing");
    }

    #[test]
    fn two_entries_hash_directly_together() {
        let h1 = make_hash(b"entry1");
        let h2 = make_hash(b"entry2");

        let root = merkle_root([h1, h2].into_iter());
        assert_eq!(root, merkle_hash(h1, h2));
    }

    #[test]
    fn three_entries_duplicate_the_last() {
        let h1 = make_hash(b"h1");
        let h2 = make_hash(b"h2");
        let h3 = make_hash(b"h3");

        // round 1: (h1,h2), (h3,h3) [duplicated] -> round 2: (a,b) -> root
        let a = merkle_hash(h1, h2);
        let b = merkle_hash(h3, h3);
        let expected = merkle_hash(a, b);

        let root = merkle_root([h1, h2, h3].into_iter());
        assert_eq!(root, expected);
    }

    #[test]
    fn nine_entries_matches_hand_rolled_rounds() {
        let hashes: Vec<Hash> = (0u8..9).map(|i| make_hash(&[i])).collect();
        let root = merkle_root(hashes.clone().into_iter());

        // round 1: 9 -> duplicate last -> 10 -> 5 pairs -> 5
        let mut round = hashes.clone();
        round.push(*round.last().unwrap());
        let mut round: Vec<Hash> = round.chunks_exact(2).map(|p| merkle_hash(p[0], p[1])).collect();
        // round 2: 5 -> duplicate last -> 6 -> 3
        round.push(*round.last().unwrap());
        let mut round: Vec<Hash> = round.chunks_exact(2).map(|p| merkle_hash(p[0], p[1])).collect();
        // round 3: 3 -> duplicate last -> 4 -> 2
        round.push(*round.last().unwrap());
        let mut round: Vec<Hash> = round.chunks_exact(2).map(|p| merkle_hash(p[0], p[1])).collect();
        // round 4: 2 -> 1
        let expected = merkle_hash(round[0], round[1]);
        round = vec![expected];

        assert_eq!(root, round[0]);
    }

    #[test]
    fn order_matters() {
        let h1 = make_hash(b"h1");
        let h2 = make_hash(b"h2");

        let root1 = merkle_root([h1, h2].into_iter());
        let root2 = merkle_root([h2, h1].into_iter());
        assert_ne!(root1, root2);
    }

    #[test]
    fn consistent_across_calls() {
        let hashes: Vec<Hash> = (0..5).map(|i| make_hash(&[i])).collect();
        let root1 = merkle_root(hashes.clone().into_iter());
        let root2 = merkle_root(hashes.into_iter());
        assert_eq!(root1, root2);
    }
}
