// Location module - Caller location resolution

pub mod normalize;
pub mod resolver;
pub mod stack;

use crate::config::{BuildMode, ResolverOptions};
use std::sync::Arc;

pub use normalize::PathNormalizer;
pub use resolver::{LabelLocator, StackLocator};
pub use stack::{parse_stack_trace, BacktraceSource, StackSource, TextSource};

/// Location reported when nothing better is known
pub const UNKNOWN_LOCATION: &str = "unknown";

/// One entry of a captured call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// File reference as reported by the runtime; empty when unknown
    pub file_name: String,
    pub line_number: Option<u32>,
    /// Symbol or function name, when the runtime reports one
    pub function: Option<String>,
}

impl StackFrame {
    pub fn new(file_name: impl Into<String>, line_number: Option<u32>) -> Self {
        Self {
            file_name: file_name.into(),
            line_number,
            function: None,
        }
    }

    /// Frame known only by its symbol
    pub fn symbol(function: impl Into<String>) -> Self {
        Self {
            file_name: String::new(),
            line_number: None,
            function: Some(function.into()),
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

/// Produces the origin string of a log call. Never fails.
pub trait LocationProvider: Send + Sync {
    fn locate(&self, label: Option<&str>) -> String;
}

/// Provider for a build mode: production trusts caller labels,
/// development always walks the stack
pub fn provider_for(
    mode: BuildMode,
    options: &ResolverOptions,
    source: Arc<dyn StackSource>,
) -> Box<dyn LocationProvider> {
    let stack = StackLocator::new(source, options);
    match mode {
        BuildMode::Production => Box::new(LabelLocator::new(stack)),
        BuildMode::Development => Box::new(stack),
    }
}
