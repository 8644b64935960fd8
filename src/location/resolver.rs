// Location providers for development and production builds

use crate::config::ResolverOptions;
use crate::error::{HostLogError, Result};
use crate::location::{LocationProvider, PathNormalizer, StackFrame, StackSource, UNKNOWN_LOCATION};
use std::sync::Arc;

/// Resolves the caller by walking the call stack
pub struct StackLocator {
    source: Arc<dyn StackSource>,
    normalizer: PathNormalizer,
    caller_depth: usize,
    validate_frames: bool,
    facade_markers: Vec<String>,
}

impl StackLocator {
    pub fn new(source: Arc<dyn StackSource>, options: &ResolverOptions) -> Self {
        let krate = env!("CARGO_CRATE_NAME");
        Self {
            source,
            normalizer: PathNormalizer::new(options),
            caller_depth: options.caller_depth,
            validate_frames: options.validate_frames,
            facade_markers: vec![
                format!("{}::logger::", krate),
                format!("{}::location::", krate),
            ],
        }
    }

    /// `file:line` of the caller, or an error when the stack does not tell
    #[inline(never)]
    pub fn resolve(&self) -> Result<String> {
        let frames = self.source.capture()?;
        let frame = self.select_caller(&frames)?;

        if frame.file_name.is_empty() {
            return Err(HostLogError::Resolution(
                "caller frame has no file reference".to_string(),
            ));
        }

        let file = self.normalizer.normalize(&frame.file_name);
        let line = frame
            .line_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());

        Ok(format!("{}:{}", file, line))
    }

    /// Pick the frame of the function that called the public log method.
    ///
    /// The frame sits at `caller_depth`. When frames carry function names the
    /// position is checked against the façade's own frames, and the frame
    /// right after the last façade frame is used instead.
    fn select_caller<'a>(&self, frames: &'a [StackFrame]) -> Result<&'a StackFrame> {
        let positional = frames.get(self.caller_depth).ok_or_else(|| {
            HostLogError::Resolution(format!(
                "stack has {} frames, caller expected at depth {}",
                frames.len(),
                self.caller_depth
            ))
        })?;

        if !self.validate_frames {
            return Ok(positional);
        }

        match frames.iter().rposition(|frame| self.is_facade_frame(frame)) {
            Some(last) => frames.get(last + 1).ok_or_else(|| {
                HostLogError::Resolution("no frame outside the logger".to_string())
            }),
            None => Ok(positional),
        }
    }

    fn is_facade_frame(&self, frame: &StackFrame) -> bool {
        match frame.function.as_deref() {
            Some(name) => self
                .facade_markers
                .iter()
                .any(|marker| name.contains(marker.as_str())),
            None => false,
        }
    }
}

impl LocationProvider for StackLocator {
    #[inline(never)]
    fn locate(&self, label: Option<&str>) -> String {
        match self.resolve() {
            Ok(location) => location,
            Err(e) => {
                tracing::debug!("Falling back from stack resolution: {}", e);
                fallback(label)
            }
        }
    }
}

/// Trusts a caller-supplied label and only walks the stack without one
pub struct LabelLocator {
    stack: StackLocator,
}

impl LabelLocator {
    pub fn new(stack: StackLocator) -> Self {
        Self { stack }
    }
}

impl LocationProvider for LabelLocator {
    #[inline(never)]
    fn locate(&self, label: Option<&str>) -> String {
        match label {
            Some(label) => label.to_string(),
            None => self.stack.locate(None),
        }
    }
}

fn fallback(label: Option<&str>) -> String {
    label.unwrap_or(UNKNOWN_LOCATION).to_string()
}
