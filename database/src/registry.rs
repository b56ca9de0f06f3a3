/// Reserved as a bucket/key separator; never used as a prefix byte itself.
pub const SEPARATOR: u8 = u8::MAX;

/// Key prefixes for every durable store the ledger and mempool maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DatabaseStorePrefixes {
    RawTx = 1,
    ProcessingTx = 2,
    FinalizedTx = 3,
    LockedUtxo = 4,
    Block = 5,
    Cube = 6,
    State = 7,
    Diff = 8,

    /// Reserved as a separator
    Separator = SEPARATOR,
}

impl TryFrom<u8> for DatabaseStorePrefixes {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use DatabaseStorePrefixes::*;
        match value {
            1 => Ok(RawTx),
            2 => Ok(ProcessingTx),
            3 => Ok(FinalizedTx),
            4 => Ok(LockedUtxo),
            5 => Ok(Block),
            6 => Ok(Cube),
            7 => Ok(State),
            8 => Ok(Diff),
            SEPARATOR => Ok(Separator),
            _ => Err(()),
        }
    }
}

impl From<DatabaseStorePrefixes> for Vec<u8> {
    fn from(value: DatabaseStorePrefixes) -> Self {
        [value as u8].to_vec()
    }
}

impl From<DatabaseStorePrefixes> for u8 {
    fn from(value: DatabaseStorePrefixes) -> Self {
        value as u8
    }
}

impl AsRef<[u8]> for DatabaseStorePrefixes {
    fn as_ref(&self) -> &[u8] {
        // SAFETY: enum has repr(u8)
        std::slice::from_ref(unsafe { &*(self as *const Self as *const u8) })
    }
}

impl IntoIterator for DatabaseStorePrefixes {
    type Item = u8;
    type IntoIter = <[u8; 1] as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        [self as u8].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_ref() {
        let prefix = DatabaseStorePrefixes::Block;
        assert_eq!(&[prefix as u8], prefix.as_ref());
        assert_eq!(
            size_of::<u8>(),
            size_of::<DatabaseStorePrefixes>(),
            "DatabaseStorePrefixes is expected to have the same memory layout of u8"
        );
    }

    #[test]
    fn round_trips_through_u8() {
        for prefix in [
            DatabaseStorePrefixes::RawTx,
            DatabaseStorePrefixes::ProcessingTx,
            DatabaseStorePrefixes::FinalizedTx,
            DatabaseStorePrefixes::LockedUtxo,
            DatabaseStorePrefixes::Block,
            DatabaseStorePrefixes::Cube,
            DatabaseStorePrefixes::State,
            DatabaseStorePrefixes::Diff,
        ] {
            assert_eq!(DatabaseStorePrefixes::try_from(prefix as u8), Ok(prefix));
        }
    }
}
