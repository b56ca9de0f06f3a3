use sha2::{Digest, Sha256};

pub trait HasherBase {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;
}

pub trait Hasher: HasherBase + Clone + Default {
    fn finalize(self) -> crate::Hash;
    fn reset(&mut self);
    #[inline(always)]
    fn hash<A: AsRef<[u8]>>(data: A) -> crate::Hash {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Plain, undifferentiated SHA-256. Every content hash in the ledger — transactions,
/// blocks, faces, cubes — runs through this same hasher. There is deliberately no
/// domain separation: two identical byte strings produced by different callers must
/// hash identically, since the canonical encoding itself is what carries meaning.
#[derive(Clone, Default)]
pub struct ContentHasher(Sha256);

impl ContentHasher {
    #[inline(always)]
    pub fn new() -> Self {
        Self(Sha256::new())
    }
}

impl HasherBase for ContentHasher {
    #[inline(always)]
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        Digest::update(&mut self.0, data.as_ref());
        self
    }
}

impl Hasher for ContentHasher {
    #[inline(always)]
    fn finalize(self) -> crate::Hash {
        let mut out = [0u8; 32];
        out.copy_from_slice(Digest::finalize(self.0).as_slice());
        crate::Hash::from_bytes(out)
    }

    #[inline(always)]
    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// One-shot helper over [`ContentHasher`] for callers that already hold a full byte slice.
#[inline]
pub fn content_hash<A: AsRef<[u8]>>(data: A) -> crate::Hash {
    ContentHasher::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_plain_sha256() {
        let mut expected = Sha256::new();
        Digest::update(&mut expected, b"hello world");
        let expected = expected.finalize();

        let got = content_hash(b"hello world");
        assert_eq!(got.as_bytes(), expected.as_slice());
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut incremental = ContentHasher::new();
        incremental.update(b"hello ").update(b"world");
        let incremental = incremental.finalize();

        let one_shot = content_hash(b"hello world");
        assert_eq!(incremental, one_shot);
    }

    #[test]
    fn empty_input_is_stable() {
        let a = content_hash(b"");
        let b = content_hash([]);
        assert_eq!(a, b);
    }
}
