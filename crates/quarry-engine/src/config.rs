//! Builder configuration.

use quarry_core::bnode::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PREFIX};
use quarry_core::{BlankNodeAllocator, RenderConfig};
use serde::{Deserialize, Serialize};

/// Builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Output layout used by `build_string` and `Display`.
    pub render: RenderConfig,

    /// Label prefix for blank nodes created by `list`.
    pub blank_node_prefix: String,

    /// Candidate labels tried per blank node before `list` fails.
    pub blank_node_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::pretty(),
            blank_node_prefix: DEFAULT_PREFIX.to_string(),
            blank_node_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Single-line output, default blank node settings.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            render: RenderConfig::default(),
            ..Self::default()
        }
    }

    /// Sets the blank node label prefix.
    #[must_use]
    pub fn with_blank_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blank_node_prefix = prefix.into();
        self
    }

    /// Sets the blank node attempt limit.
    #[must_use]
    pub fn with_blank_node_attempts(mut self, attempts: usize) -> Self {
        self.blank_node_attempts = attempts;
        self
    }

    /// Sets the output layout.
    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub(crate) fn allocator(&self) -> BlankNodeAllocator {
        BlankNodeAllocator::new(&self.blank_node_prefix, self.blank_node_attempts)
    }
}
