//! Limits applied while unpacking untrusted input.

/// Size and nesting limits for an [`Unpacker`](super::Unpacker).
///
/// A declared length over a limit is rejected before its payload is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackerConfig {
    max_depth: usize,
    raw_size_limit: usize,
    array_size_limit: u32,
    map_size_limit: u32,
}

impl Default for UnpackerConfig {
    fn default() -> Self {
        Self {
            max_depth: 512,
            raw_size_limit: 128 * 1024 * 1024,
            array_size_limit: 4 * 1024 * 1024,
            map_size_limit: 4 * 1024 * 1024,
        }
    }
}

impl UnpackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of nested open arrays and maps.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum byte length of a str or bin payload.
    pub fn raw_size_limit(mut self, limit: usize) -> Self {
        self.raw_size_limit = limit;
        self
    }

    /// Sets the maximum declared element count of an array.
    pub fn array_size_limit(mut self, limit: u32) -> Self {
        self.array_size_limit = limit;
        self
    }

    /// Sets the maximum declared entry count of a map.
    pub fn map_size_limit(mut self, limit: u32) -> Self {
        self.map_size_limit = limit;
        self
    }

    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get_raw_size_limit(&self) -> usize {
        self.raw_size_limit
    }

    pub fn get_array_size_limit(&self) -> u32 {
        self.array_size_limit
    }

    pub fn get_map_size_limit(&self) -> u32 {
        self.map_size_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = UnpackerConfig::new().max_depth(4).raw_size_limit(16);
        assert_eq!(config.get_max_depth(), 4);
        assert_eq!(config.get_raw_size_limit(), 16);
        assert_eq!(
            config.get_array_size_limit(),
            UnpackerConfig::default().get_array_size_limit()
        );
    }
}
