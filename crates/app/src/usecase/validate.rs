//! Input validation shared by the use cases.

use rust_decimal::Decimal;

use crate::error::UseCaseError;

/// Longest accepted name or title, in characters.
const MAX_NAME_LENGTH: usize = 120;

/// A trimmed, non-blank name of reasonable length.
pub(crate) fn name(field: &'static str, value: &str) -> Result<String, UseCaseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UseCaseError::invalid(field, "must not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(UseCaseError::invalid(
            field,
            format!("must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// `#RRGGBB`, case-insensitive.
pub(crate) fn hex_color(field: &'static str, value: &str) -> Result<(), UseCaseError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(UseCaseError::invalid(field, format!("expected #RRGGBB, got {value:?}")))
    }
}

pub(crate) fn price(field: &'static str, value: Decimal) -> Result<(), UseCaseError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UseCaseError::invalid(field, "must not be negative"));
    }
    Ok(())
}

pub(crate) fn skill_level(value: i32) -> Result<(), UseCaseError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(UseCaseError::invalid("level", format!("must be 1 to 5, got {value}")))
    }
}

pub(crate) fn guest_count(value: i32) -> Result<(), UseCaseError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(UseCaseError::invalid("guest_count", "must be at least 1"))
    }
}

/// A single path segment: no separators, no dot-only names.
pub(crate) fn file_name(value: &str) -> Result<(), UseCaseError> {
    if value.trim().is_empty() {
        return Err(UseCaseError::invalid("file_name", "must not be blank"));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(UseCaseError::invalid("file_name", "must be a plain file name"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(name("name", "  Lunch  ").ok(), Some("Lunch".to_owned()));
        assert!(name("name", "   ").is_err());
        assert!(name("name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(hex_color("primary_color", "#1a2B3c").is_ok());
        assert!(hex_color("primary_color", "1a2b3c").is_err());
        assert!(hex_color("primary_color", "#12345").is_err());
        assert!(hex_color("primary_color", "#GGGGGG").is_err());
    }

    #[test]
    fn test_price_allows_zero_but_not_negative() {
        assert!(price("price", Decimal::ZERO).is_ok());
        assert!(price("price", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_skill_level_and_guest_count_bounds() {
        assert!(skill_level(1).is_ok());
        assert!(skill_level(5).is_ok());
        assert!(skill_level(0).is_err());
        assert!(skill_level(6).is_err());
        assert!(guest_count(1).is_ok());
        assert!(guest_count(0).is_err());
    }

    #[test]
    fn test_file_name_rejects_paths() {
        assert!(file_name("logo.png").is_ok());
        assert!(file_name("../logo.png").is_err());
        assert!(file_name("..").is_err());
        assert!(file_name("").is_err());
    }
}
