//! Conversions between wire DTOs, local rows and domain models.
//!
//! Each aggregate gets `From` impls in both directions for every pair it
//! needs:
//!
//! - DTO → domain (sync pull, echoed writes)
//! - domain → DTO (writes)
//! - domain → row (caching)
//! - row → domain (reads)
//!
//! Conversions that parse text (decimal prices, statuses, the plan feature
//! JSON) are `TryFrom` and fail with [`RepositoryError::DataCorruption`].

pub mod cv;
pub mod invitation;
pub mod menu;
pub mod portfolio;
pub mod profile;
pub mod shop;
pub mod subscription;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::RepositoryError;

/// Parse a decimal stored as text.
pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {field} in database: {value:?} ({e})"))
    })
}

/// Parse an enum stored as text.
pub(crate) fn parse_text<T>(value: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(RepositoryError::DataCorruption)
}

/// Convert a batch, failing on the first bad element.
pub(crate) fn try_convert_all<S, T>(items: Vec<S>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<S, Error = RepositoryError>,
{
    items.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atomo_core::RsvpStatus;

    use super::*;

    #[test]
    fn test_parse_decimal_keeps_exact_value() {
        assert_eq!(parse_decimal("price", "12.50").unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        let err = parse_decimal("price", "twelve").unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(msg) if msg.contains("price")));
    }

    #[test]
    fn test_parse_text_maps_to_data_corruption() {
        assert_eq!(parse_text::<RsvpStatus>("maybe").unwrap(), RsvpStatus::Maybe);
        assert!(matches!(
            parse_text::<RsvpStatus>("perhaps"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
