//! Terminal styling for status messages.
//!
//! - **stdout**: Primary data output (`key: value` blocks, JSON)
//! - **stderr**: Failure notifications
//!
//! Output goes through `anstream`, which strips the ANSI codes when the stream
//! is not a terminal or `NO_COLOR` is set.

use color_print::{cformat, cstr};

pub use anstream::{eprintln, println};

pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");

/// Format an error message with symbol and red styling
pub fn error_message(content: impl AsRef<str>) -> String {
    cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref())
}
