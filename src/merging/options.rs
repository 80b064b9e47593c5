//! Merging configuration.

/// Tunables for a class-merging pass.
#[derive(Debug, Clone)]
pub struct MergerOptions {
    /// Upper bound on the number of classes a single group may merge.
    /// Oversized groups are chunked by the group-limiting policy.
    pub max_group_size: usize,
    /// Whether interfaces are considered for merging at all.
    pub enable_interface_merging: bool,
}

impl Default for MergerOptions {
    fn default() -> Self {
        Self {
            max_group_size: 30,
            enable_interface_merging: true,
        }
    }
}

impl MergerOptions {
    /// Options with a custom group-size cap.
    pub fn with_max_group_size(mut self, max_group_size: usize) -> Self {
        debug_assert!(max_group_size >= 2);
        self.max_group_size = max_group_size;
        self
    }

    /// Options with interface merging switched off.
    pub fn without_interface_merging(mut self) -> Self {
        self.enable_interface_merging = false;
        self
    }
}
