//! File anchors

use std::fmt::Write;

/// Stable page-independent identifier for a source path.
///
/// ASCII letters, digits and `.` are kept, `/` becomes `-`, and any other
/// character is written as `_<hex codepoint>_`. Since `-` and `_` themselves
/// are always escaped, two different paths never share an anchor.
pub fn anchor_for(source_path: &str) -> String {
    let mut anchor = String::with_capacity(source_path.len());
    for c in source_path.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' => anchor.push(c),
            '/' => anchor.push('-'),
            other => {
                let _ = write!(anchor, "_{:x}_", u32::from(other));
            }
        }
    }
    anchor
}
