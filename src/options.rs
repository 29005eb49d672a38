use crate::Utf8Cache;
use std::sync::Arc;

pub const DEFAULT_MAX_UNKNOWN_ATTRIBUTE_LENGTH: u32 = 8 * 1024 * 1024;
pub const DEFAULT_MAX_ANNOTATION_DEPTH: usize = 64;

/// Limits and optional collaborators for [`JavaClass::parse_with`](crate::JavaClass::parse_with).
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Unknown attributes declaring a longer payload are rejected instead of being copied.
    pub max_unknown_attribute_length: u32,
    /// Deepest allowed nesting of element values inside annotations.
    pub max_annotation_depth: usize,
    /// Classes with a newer major version are rejected. `None` accepts any version.
    pub max_major_version: Option<u16>,
    /// Shared deduplication of `CONSTANT_Utf8` values across parses.
    pub utf8_cache: Option<Arc<Utf8Cache>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            max_unknown_attribute_length: DEFAULT_MAX_UNKNOWN_ATTRIBUTE_LENGTH,
            max_annotation_depth: DEFAULT_MAX_ANNOTATION_DEPTH,
            max_major_version: None,
            utf8_cache: None,
        }
    }
}

impl ReadOptions {
    pub fn with_max_unknown_attribute_length(mut self, max: u32) -> Self {
        self.max_unknown_attribute_length = max;
        self
    }

    pub fn with_max_annotation_depth(mut self, max: usize) -> Self {
        self.max_annotation_depth = max;
        self
    }

    pub fn with_max_major_version(mut self, max: u16) -> Self {
        self.max_major_version = Some(max);
        self
    }

    pub fn with_utf8_cache(mut self, cache: Arc<Utf8Cache>) -> Self {
        self.utf8_cache = Some(cache);
        self
    }
}
