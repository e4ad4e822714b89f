use std::fmt;

/// Log-safe view of a license plate: keeps the first two characters and
/// masks the rest, so `tracing` output never carries a full plate.
#[derive(Clone, Copy)]
pub struct MaskedPlate<'a>(pub &'a str);

impl fmt::Display for MaskedPlate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(2).collect();
        write!(f, "{}****", visible)
    }
}

impl fmt::Debug for MaskedPlate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Trimmed plate, or `None` when nothing but whitespace was entered
pub fn normalize(plate: &str) -> Option<&str> {
    let trimmed = plate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_plate_hides_suffix() {
        assert_eq!(MaskedPlate("AB-123").to_string(), "AB****");
        assert_eq!(format!("{:?}", MaskedPlate("X")), "X****");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  AB-123 "), Some("AB-123"));
        assert_eq!(normalize(""), None);
        assert_eq!(normalize(" \t "), None);
    }
}
