//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player or team name, in characters.
const MAX_NAME_CHARS: usize = 80;

/// Validates that a player name is not blank and stays within [`MAX_NAME_CHARS`].
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Khvicha Kvaratskhelia") // Ok
/// validate_player_name("   ")                   // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player name cannot be blank".into());
        return Err(err);
    }

    let chars = trimmed.chars().count();
    if chars > MAX_NAME_CHARS {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!("Player name must be at most {MAX_NAME_CHARS} characters (got {chars})")
                .into(),
        );
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_name_format");
        err.message = Some("Player name cannot contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("Mike Maignan").is_ok());
        assert!(validate_player_name("  Lautaro Martínez ").is_ok());
        assert!(validate_player_name(&"é".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn test_validate_player_name_blank() {
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name(" \t ").is_err());
    }

    #[test]
    fn test_validate_player_name_invalid() {
        assert!(validate_player_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
        assert!(validate_player_name("Dušan\nVlahović").is_err());
    }
}
