use serde::{Deserialize, Serialize};

/// Handle for a student stored in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub usize);

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Separator between the labels of sections combined into one merged course
pub const MERGED_LABEL_SEPARATOR: &str = " + ";

/// Course prefix of a label: everything before a trailing `-section`.
///
/// ```
/// use roster_match::core::types::course_prefix;
///
/// assert_eq!(course_prefix("CS261-9"), "CS261");
/// assert_eq!(course_prefix("CS410"), "CS410");
/// assert_eq!(course_prefix("CS160-"), "CS160-");
/// ```
#[must_use]
pub fn course_prefix(label: &str) -> &str {
    match label.rsplit_once('-') {
        Some((prefix, section)) if !prefix.is_empty() && !section.is_empty() => prefix,
        _ => label,
    }
}

/// Labs directory name of a label: everything before its first `-`.
///
/// This is coarser than [`course_prefix`] for labels with several dashes.
///
/// ```
/// use roster_match::core::types::grade_prefix;
///
/// assert_eq!(grade_prefix("CS261-9"), "CS261");
/// assert_eq!(grade_prefix("MATH-150-2"), "MATH");
/// assert_eq!(grade_prefix("CS410"), "CS410");
/// ```
#[must_use]
pub fn grade_prefix(label: &str) -> &str {
    match label.split_once('-') {
        Some((prefix, _)) if !prefix.is_empty() => prefix,
        _ => label,
    }
}

/// Confidence in a course inferred from submission filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceBasis {
    /// Only one section explained any of the filenames
    SingleSection,
    /// Several sections matched but all belong to one course
    SharedPrefix,
    /// Several courses matched; the one explaining the most students won
    Plurality,
}

impl std::fmt::Display for InferenceBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleSection => write!(f, "single section"),
            Self::SharedPrefix => write!(f, "shared course prefix"),
            Self::Plurality => write!(f, "most matched students"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_prefix_multi_dash() {
        assert_eq!(course_prefix("MATH-150-2"), "MATH-150");
        assert_eq!(course_prefix("-3"), "-3");
    }

    #[test]
    fn test_grade_prefix_uses_first_dash() {
        assert_eq!(grade_prefix("MATH-150-2"), "MATH");
        assert_eq!(grade_prefix("CS160-"), "CS160");
        assert_eq!(grade_prefix("-3"), "-3");
    }

    #[test]
    fn test_student_id_display() {
        assert_eq!(StudentId(4).to_string(), "#4");
    }
}
