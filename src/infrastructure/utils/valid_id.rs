use uuid::Uuid;

use crate::errors::AppError;

/// Parses a numeric row id taken from a path segment.
pub fn valid_row_id(id: &str) -> Result<i64, AppError> {
    id.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidInput("Invalid id".to_string()))
}

pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput("Invalid UUID format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids_must_be_positive_integers() {
        assert_eq!(valid_row_id("42").unwrap(), 42);
        assert!(valid_row_id("0").is_err());
        assert!(valid_row_id("abc").is_err());
    }

    #[test]
    fn uuids_are_parsed() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string()).unwrap(), id);
        assert!(valid_uuid("nope").is_err());
    }
}
