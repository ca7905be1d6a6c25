use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::core::name::{name_words, strip_parenthetical};
use crate::core::student::{full_name_key, Student};
use crate::core::types::StudentId;

/// Owns every student and the lookup indexes over them
#[derive(Debug, Default, Clone)]
pub struct StudentRegistry {
    /// All students in registration order; `StudentId` indexes this vec
    students: Vec<Student>,

    /// Index: email -> student
    by_email: HashMap<String, StudentId>,

    /// Index: "First Last" -> student
    by_full_name: HashMap<String, StudentId>,

    /// Index: last name -> the only student with that last name.
    /// An entry is removed the first time a second student with the same
    /// last name registers and never comes back (see `ambiguous_last_names`).
    last_name_shortcut: HashMap<String, StudentId>,

    /// Last names seen on more than one student
    ambiguous_last_names: HashSet<String>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a roster row to a student, creating one if needed, and record `course_label`.
    ///
    /// Lookup order is email, then "First Last". The course label is appended
    /// every time, even if the student already lists it.
    pub fn register_or_fetch(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        course_label: &str,
    ) -> StudentId {
        let full_name = full_name_key(first_name, last_name);

        let id = if let Some(&id) = self.by_email.get(email) {
            id
        } else if let Some(&id) = self.by_full_name.get(&full_name) {
            debug!("{full_name} matched by name under a different email ({email})");
            id
        } else {
            self.insert(first_name, last_name, email, full_name)
        };

        self.students[id.0].add_course(course_label);
        id
    }

    fn insert(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        full_name: String,
    ) -> StudentId {
        let id = StudentId(self.students.len());
        self.students
            .push(Student::new(id, first_name, last_name, email));

        self.by_email.insert(email.to_string(), id);
        self.by_full_name.insert(full_name, id);
        self.index_last_name(last_name, id);
        id
    }

    fn index_last_name(&mut self, last_name: &str, id: StudentId) {
        if self.ambiguous_last_names.contains(last_name) {
            return;
        }
        if self.last_name_shortcut.remove(last_name).is_some() {
            debug!("last name {last_name} is shared; dropping shortcut");
            self.ambiguous_last_names.insert(last_name.to_string());
        } else {
            self.last_name_shortcut.insert(last_name.to_string(), id);
        }
    }

    /// Get a student by handle.
    ///
    /// Handles are only minted by this registry, so an unknown handle is a bug.
    pub fn get(&self, id: StudentId) -> &Student {
        &self.students[id.0]
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Student> {
        self.by_email.get(email).map(|&id| self.get(id))
    }

    pub fn find_by_full_name(&self, full_name: &str) -> Option<&Student> {
        self.by_full_name.get(full_name).map(|&id| self.get(id))
    }

    /// Look up through the last-name shortcut; `None` when absent or shared
    pub fn find_by_last_name(&self, last_name: &str) -> Option<&Student> {
        self.last_name_shortcut.get(last_name).map(|&id| self.get(id))
    }

    pub fn is_ambiguous_last_name(&self, last_name: &str) -> bool {
        self.ambiguous_last_names.contains(last_name)
    }

    /// Resolve a free-form display name such as "Ann Smith (she/her)" or "John Doe Jr."
    pub fn find_by_name(&self, display_name: &str) -> Option<&Student> {
        let name = strip_parenthetical(display_name);
        if let Some(student) = self.find_by_full_name(name) {
            return Some(student);
        }

        let words = name_words(name);
        let (Some(first), Some(last)) = (words.first(), words.last()) else {
            warn!("unable to find {display_name}");
            return None;
        };

        let found = self.find_by_last_name(last);
        if found.is_none() {
            warn!("{first} {last} not found");
        }
        found
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
