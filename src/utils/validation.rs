//! Validation of names that become paths under the grading directory.

use thiserror::Error;

/// Longest filename most filesystems accept
pub const MAX_FILENAME_LENGTH: usize = 255;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid path component '{0}': contains path traversal or control characters")]
    InvalidComponent(String),
    #[error("Empty filename provided")]
    EmptyFilename,
}

/// Check that `name` is usable as a single path component.
///
/// Submission and roster data decide destination paths (`<email>/<canonical>`),
/// so a name containing a separator or `..` would escape the grading directory.
///
/// # Examples
///
/// ```
/// use roster_match::utils::validation::validate_path_component;
///
/// assert!(validate_path_component("essay.docx").is_ok());
/// assert!(validate_path_component("asmith@example.edu").is_ok());
/// assert!(validate_path_component("../essay.docx").is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError` when the name is blank, too long, or contains a
/// separator, `..`, or a control character.
pub fn validate_path_component(name: &str) -> Result<&str, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if name.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ValidationError::InvalidComponent(name.to_string()));
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::InvalidComponent(name.escape_default().to_string()));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_rejected() {
        for attempt in ["..", "../x", "a/b", "a\\b", "x..y"] {
            assert!(
                matches!(
                    validate_path_component(attempt),
                    Err(ValidationError::InvalidComponent(_))
                ),
                "'{attempt}' should be rejected"
            );
        }
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(validate_path_component("lab\0.py").is_err());
        assert!(validate_path_component("lab\x1f.py").is_err());
    }

    #[test]
    fn test_blank_and_long() {
        assert_eq!(
            validate_path_component("  "),
            Err(ValidationError::EmptyFilename)
        );
        let long = "a".repeat(MAX_FILENAME_LENGTH + 1);
        assert_eq!(
            validate_path_component(&long),
            Err(ValidationError::FilenameTooLong)
        );
    }

    #[test]
    fn test_ordinary_names_pass_through() {
        assert_eq!(validate_path_component("Lab 1.py"), Ok("Lab 1.py"));
        assert_eq!(validate_path_component(".classpath"), Ok(".classpath"));
    }
}
