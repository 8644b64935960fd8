// Call stack capture and stack trace parsing

use crate::error::{HostLogError, Result};
use crate::location::StackFrame;
use std::backtrace::{Backtrace, BacktraceStatus};

/// Supplier of the current call stack.
///
/// Frame 0 of the returned sequence is the function that called `capture`.
pub trait StackSource: Send + Sync {
    fn capture(&self) -> Result<Vec<StackFrame>>;
}

/// Captures the native stack of the running thread
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceSource;

impl StackSource for BacktraceSource {
    #[inline(never)]
    fn capture(&self) -> Result<Vec<StackFrame>> {
        let trace = Backtrace::force_capture();
        if trace.status() != BacktraceStatus::Captured {
            return Err(HostLogError::Resolution(
                "stack capture is not supported on this platform".to_string(),
            ));
        }

        let frames = parse_stack_trace(&trace.to_string());

        // Drop the unwinder's frames and this function's own frame
        let start = frames
            .iter()
            .position(|frame| !is_capture_frame(frame))
            .ok_or_else(|| HostLogError::Resolution("captured stack is empty".to_string()))?;

        Ok(frames.into_iter().skip(start).collect())
    }
}

fn is_capture_frame(frame: &StackFrame) -> bool {
    frame
        .function
        .as_deref()
        .map(|name| name.to_ascii_lowercase().contains("backtrace"))
        .unwrap_or(false)
}

/// Stack supplied as text by the embedding runtime, e.g. a webview's
/// `Error().stack`
pub struct TextSource<F> {
    provider: F,
}

impl<F> TextSource<F>
where
    F: Fn() -> Option<String> + Send + Sync,
{
    pub fn new(provider: F) -> Self {
        Self { provider }
    }
}

impl<F> StackSource for TextSource<F>
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn capture(&self) -> Result<Vec<StackFrame>> {
        let text = (self.provider)()
            .ok_or_else(|| HostLogError::Resolution("no stack trace available".to_string()))?;
        Ok(parse_stack_trace(&text))
    }
}

/// Parse a textual stack trace into frames, innermost first.
///
/// Understands the native Rust backtrace layout
/// (`  3: path::to::function` followed by `at file:line:col`), V8 lines
/// (`    at fn (file:line:col)`) and SpiderMonkey lines (`fn@file:line:col`).
/// Lines that fit none of them are skipped.
pub fn parse_stack_trace(text: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();
    // Set while the last frame is a native symbol still waiting for its `at` line
    let mut awaiting_location = false;
    let mut native = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if awaiting_location {
                if let Some(frame) = frames.last_mut() {
                    let (file, line_number) = split_location(location.trim());
                    frame.file_name = file.to_string();
                    frame.line_number = line_number;
                }
                awaiting_location = false;
            } else {
                frames.push(parse_v8_frame(location.trim()));
            }
            continue;
        }

        if let Some(symbol) = native_symbol(line) {
            native = true;
            frames.push(StackFrame::symbol(symbol));
            awaiting_location = true;
            continue;
        }

        if native {
            // Inlined function sharing the previous frame's index
            if line.contains("::") || line.starts_with('<') {
                frames.push(StackFrame::symbol(line));
                awaiting_location = true;
            }
            continue;
        }

        if let Some((function, location)) = line.split_once('@') {
            let (file, line_number) = split_location(location);
            frames.push(StackFrame {
                file_name: file.to_string(),
                line_number,
                function: non_empty(function),
            });
        }
    }

    frames
}

/// Symbol of a native frame line such as `12: core::ops::function::FnOnce::call_once`
fn native_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.split_once(": ")?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(symbol.trim())
}

/// V8 frame body: `fn (location)`, `async fn (location)` or a bare location.
///
/// Eval frames (`eval (eval at f (file:1:2), <anonymous>:3:4)`) are
/// attributed to the file that called `eval`.
fn parse_v8_frame(body: &str) -> StackFrame {
    if let Some(open) = outer_paren(body) {
        let function = &body[..open];
        let location = &body[open + 1..body.len() - 1];

        if let Some(origin) = location.strip_prefix("eval at ") {
            let site = match origin.rsplit_once(", ") {
                Some((site, _)) => site,
                None => origin,
            };
            let inner = parse_v8_frame(site);
            return StackFrame {
                function: non_empty(function),
                ..inner
            };
        }

        let (file, line_number) = split_location(location);
        return StackFrame {
            file_name: file.to_string(),
            line_number,
            function: non_empty(function),
        };
    }

    let (file, line_number) = split_location(body);
    StackFrame {
        file_name: file.to_string(),
        line_number,
        function: None,
    }
}

/// Byte index of the `(` matching a trailing `)`, when preceded by a space
fn outer_paren(body: &str) -> Option<usize> {
    if !body.ends_with(')') {
        return None;
    }

    let mut depth = 0usize;
    for (index, c) in body.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return body[..index].ends_with(' ').then_some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `file:line:col` or `file:line` into the file and its line number
pub fn split_location(location: &str) -> (&str, Option<u32>) {
    let Some((rest, last)) = location.rsplit_once(':') else {
        return (location, None);
    };
    let Ok(last) = last.parse::<u32>() else {
        return (location, None);
    };

    match rest.rsplit_once(':') {
        Some((file, line)) => match line.parse::<u32>() {
            Ok(line) => (file, Some(line)),
            Err(_) => (rest, Some(last)),
        },
        None => (rest, Some(last)),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
