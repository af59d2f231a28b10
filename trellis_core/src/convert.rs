// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text-to-value converters for markup attributes.

use alloc::string::ToString;

use crate::error::TreeError;

/// Converts `"true"` / `"false"` to a `bool`.
///
/// Surrounding whitespace is ignored and the comparison is ASCII
/// case-insensitive. Any other input fails with [`TreeError::Format`].
pub fn boolean_converter(text: &str) -> Result<bool, TreeError> {
    let normalized = text.trim();
    if normalized.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if normalized.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(TreeError::Format {
            input: text.to_string(),
        })
    }
}
