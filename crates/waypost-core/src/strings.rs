/// True when `value` is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True when `value` is absent, empty or only whitespace.
pub fn is_null_or_blank(value: Option<&str>) -> bool {
    value.map_or(true, is_blank)
}
