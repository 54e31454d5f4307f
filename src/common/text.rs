// src/common/text.rs

/// Texto aparado, ou `None` quando ausente ou em branco.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blanks_become_none() {
        assert_eq!(non_empty(Some("  Ana ")), Some("Ana".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
