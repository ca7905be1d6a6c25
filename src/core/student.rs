use serde::{Deserialize, Serialize};

use crate::core::types::StudentId;

/// A student enrolled in one or more course sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Registry handle
    pub id: StudentId,

    pub first_name: String,

    pub last_name: String,

    /// Primary email; authoritative identity and per-student directory name
    pub email: String,

    /// Course labels in load order. Not deduplicated.
    #[serde(default)]
    pub courses: Vec<String>,
}

impl Student {
    pub fn new(
        id: StudentId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            courses: Vec::new(),
        }
    }

    /// "First Last", the key used by the full-name index
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name_key(&self.first_name, &self.last_name)
    }

    pub fn add_course(&mut self, label: impl Into<String>) {
        self.courses.push(label.into());
    }

    /// Whether `token` reads as this student's last name followed by their first name.
    ///
    /// Both names are compared lowercased and only as prefixes, so trailing
    /// text in the token (a middle name, a student number) is ignored.
    #[must_use]
    pub fn matches_name_token(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        let last = self.last_name.to_lowercase();
        token
            .strip_prefix(&last)
            .is_some_and(|rest| rest.starts_with(&self.first_name.to_lowercase()))
    }
}

impl std::fmt::Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.first_name,
            self.last_name,
            self.email,
            self.courses.join(", ")
        )
    }
}

/// Build the full-name index key for a first/last pair
#[must_use]
pub fn full_name_key(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}
