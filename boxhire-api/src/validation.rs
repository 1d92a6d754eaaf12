/// Custom field validators for request bodies
///
/// Used through `#[validate(custom(function = "..."))]`. Both run on the raw
/// field value before handlers trim it.

use boxhire_shared::auth::password;
use validator::ValidationError;

/// Rejects empty and whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Applies the shared password length policy
pub fn password_policy(value: &str) -> Result<(), ValidationError> {
    password::validate_password_length(value).map_err(|message| {
        let mut err = ValidationError::new("length");
        err.message = Some(message.into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxhire_shared::auth::password::MIN_PASSWORD_LENGTH;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Acme").is_ok());
        assert!(not_blank("  Acme ").is_ok());
        assert!(not_blank("").is_err());
        assert_eq!(not_blank(" \t\n").unwrap_err().code, "blank");
    }

    #[test]
    fn test_password_policy() {
        let shortest = "x".repeat(MIN_PASSWORD_LENGTH);
        assert!(password_policy(&shortest).is_ok());

        let err = password_policy(&shortest[1..]).unwrap_err();
        assert_eq!(err.code, "length");
        assert_eq!(
            err.message.as_deref(),
            Some("Password must be at least 6 characters long")
        );
    }
}
