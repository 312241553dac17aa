/// Direction of a transfer between memory and a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveMode {
    /// Memory to stream.
    Serialize,
    /// Stream to memory.
    Deserialize,
}

impl ArchiveMode {
    #[inline(always)]
    pub fn is_serialize(self) -> bool {
        self == Self::Serialize
    }

    #[inline(always)]
    pub fn is_deserialize(self) -> bool {
        self == Self::Deserialize
    }
}
