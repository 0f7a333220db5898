//! Pluralization for status lines.

/// `"1 object"`, `"3 objects"`, `"0 objects"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
