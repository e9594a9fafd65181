//! The record discriminator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Selects which field list governs a record's shape.
///
/// The four built-in types are exposed as constructors, but the set is open:
/// any non-empty identifier made of ASCII letters, digits, `_` or `-` is a
/// valid form type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormType(String);

impl FormType {
    pub const STUDENT: &'static str = "student";
    pub const COURSE: &'static str = "course";
    pub const BRANCH: &'static str = "branch";
    pub const EXAM_RESULT: &'static str = "examResult";

    /// Maximum accepted length of a form type identifier.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a form type identifier.
    pub fn new(value: impl Into<String>) -> crate::Result<Self> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= Self::MAX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(value))
        } else {
            Err(Error::InvalidFormType(value))
        }
    }

    #[must_use]
    pub fn student() -> Self {
        Self(Self::STUDENT.to_string())
    }

    #[must_use]
    pub fn course() -> Self {
        Self(Self::COURSE.to_string())
    }

    #[must_use]
    pub fn branch() -> Self {
        Self(Self::BRANCH.to_string())
    }

    #[must_use]
    pub fn exam_result() -> Self {
        Self(Self::EXAM_RESULT.to_string())
    }

    /// The four form types the system ships defaults for.
    #[must_use]
    pub fn builtin() -> [Self; 4] {
        [
            Self::student(),
            Self::course(),
            Self::branch(),
            Self::exam_result(),
        ]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FormType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FormType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormType> for String {
    fn from(value: FormType) -> Self {
        value.0
    }
}

impl AsRef<str> for FormType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
