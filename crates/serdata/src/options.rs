/// Options for [`ArraySerializer`](crate::ArraySerializer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayOptions {
    /// Largest element count accepted when deserializing.
    pub max_len: usize,
    /// Whether blittable element types may use the contiguous block path.
    pub fast_path: bool,
}

impl ArrayOptions {
    /// Upper bound of the 32-bit length prefix.
    pub const MAX_LEN: usize = i32::MAX as usize;

    pub const fn new() -> Self {
        Self {
            max_len: Self::MAX_LEN,
            fast_path: true,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_fast_path(mut self, fast_path: bool) -> Self {
        self.fast_path = fast_path;
        self
    }
}

impl Default for ArrayOptions {
    fn default() -> Self {
        Self::new()
    }
}
