use crate::error::ValidationError;
use crate::server::constants::MAX_LISTING_ELEMENTS;

pub const DEFAULT_LIMIT: i32 = 50;

pub fn validate_limit(limit: i32) -> Result<(), ValidationError> {
    if limit < 1 {
        return Err(ValidationError::InvalidInput {
            value: limit.to_string(),
            reason: "limit should be >= 1".to_string(),
        });
    }
    if limit > MAX_LISTING_ELEMENTS {
        return Err(ValidationError::LimitExceeded {
            subject: "listing limit".to_string(),
            unit: "element".to_string(),
            attempted: limit as usize,
            limit: MAX_LISTING_ELEMENTS as usize,
        });
    }
    Ok(())
}
