//! Helpers shared by the language analyzers

/// Bounds-checked `&source[start..end]`
///
/// # Example
/// ```rust
/// use depindex::common::safe_slice;
/// let text = b"package com.acme;";
/// assert_eq!(safe_slice(text, 0, 7), Some(&b"package"[..]));
/// assert!(safe_slice(text, 8, 99).is_none());
/// ```
pub fn safe_slice(source: &[u8], start: usize, end: usize) -> Option<&[u8]> {
    if start <= end && end <= source.len() {
        Some(&source[start..end])
    } else {
        None
    }
}

/// Text covered by a tree-sitter node, or None if the span is not valid UTF-8
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a [u8]) -> Option<&'a str> {
    let bytes = safe_slice(source, node.start_byte(), node.end_byte())?;
    std::str::from_utf8(bytes).ok()
}

/// Collapse every run of whitespace (including newlines) into one space
///
/// Keeps type and signature strings stable across reformatting.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_slice_bounds() {
        let source = b"abc";
        assert_eq!(safe_slice(source, 0, 3), Some(&b"abc"[..]));
        assert_eq!(safe_slice(source, 2, 1), None);
        assert_eq!(safe_slice(source, 0, 4), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Map<String,\n     User>"), "Map<String, User>");
        assert_eq!(collapse_whitespace("  int  "), "int");
    }
}
