//! Fallback field lists for form types the admin has never configured.

use formstack_model::{FieldConfig, FormType};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{EngineError, EngineResult};

/// Per-form-type default field lists.
///
/// Defaults are configuration, not state: they are never persisted, and a
/// form type stops using them as soon as its list is set once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultFields {
    lists: BTreeMap<FormType, Vec<FieldConfig>>,
}

impl DefaultFields {
    /// No defaults at all; unconfigured types have empty field lists.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The lists shipped for the four built-in form types.
    #[must_use]
    pub fn builtin() -> Self {
        let mut lists = BTreeMap::new();
        lists.insert(
            FormType::student(),
            vec![
                FieldConfig::text("student-name", "studentName", "Student name"),
                FieldConfig::text("student-guardian", "guardianName", "Guardian name").optional(),
                FieldConfig::date("student-dob", "dateOfBirth", "Date of birth"),
                FieldConfig::select("student-gender", "gender", "Gender", ["Male", "Female", "Other"]),
                FieldConfig::text("student-phone", "phone", "Phone number"),
                FieldConfig::text("student-email", "email", "Email").optional(),
                FieldConfig::text("student-course", "course", "Course"),
                FieldConfig::file("student-photo", "studentPhoto", "Photo"),
                FieldConfig::file("student-signature", "signature", "Signature"),
                FieldConfig::file("student-documents", "documents", "Documents")
                    .with_description("ID proof or previous marksheets")
                    .optional(),
            ],
        );
        lists.insert(
            FormType::course(),
            vec![
                FieldConfig::text("course-name", "name", "Course name"),
                FieldConfig::text("course-duration", "duration", "Duration"),
                FieldConfig::number("course-fee", "fee", "Fee"),
                FieldConfig::text("course-description", "description", "Description").optional(),
                FieldConfig::file("course-image", "courseImage", "Course image").optional(),
            ],
        );
        lists.insert(
            FormType::branch(),
            vec![
                FieldConfig::text("branch-name", "branchName", "Branch name"),
                FieldConfig::text("branch-code", "branchCode", "Branch code"),
                FieldConfig::text("branch-address", "address", "Address"),
                FieldConfig::text("branch-contact", "contactNumber", "Contact number"),
                FieldConfig::file("branch-doc-1", "branchDocument1", "Registration document"),
                FieldConfig::file("branch-doc-2", "branchDocument2", "Additional document").optional(),
            ],
        );
        lists.insert(
            FormType::exam_result(),
            vec![
                FieldConfig::text("exam-name", "examName", "Exam name"),
                FieldConfig::select(
                    "exam-type",
                    "examType",
                    "Exam type",
                    ["Midterm", "Final", "Quiz", "Practical"],
                ),
                FieldConfig::text("exam-course", "course", "Course / subject"),
                FieldConfig::date("exam-date", "examDate", "Exam date"),
                FieldConfig::file("exam-paper", "examPaper", "Exam paper")
                    .with_description("PDF, DOC or image"),
                FieldConfig::number("exam-total", "totalMarks", "Total marks"),
                FieldConfig::number("exam-passing", "passingMarks", "Passing marks"),
                FieldConfig::text("exam-venue", "examVenue", "Venue"),
            ],
        );
        Self { lists }
    }

    /// Parses lists from TOML, one array of tables per form type:
    ///
    /// ```toml
    /// [[course]]
    /// id = "c1"
    /// name = "title"
    /// label = "Title"
    /// inputType = "text"
    /// ```
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let raw: BTreeMap<String, Vec<FieldConfig>> = toml::from_str(source)
            .map_err(|e| EngineError::Config(format!("invalid default fields: {e}")))?;
        let mut lists = BTreeMap::new();
        for (form_type, fields) in raw {
            let form_type = FormType::new(form_type)
                .map_err(|e| EngineError::Config(e.to_string()))?;
            lists.insert(form_type, fields);
        }
        Ok(Self { lists })
    }

    pub fn load_toml(path: &Path) -> EngineResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Replaces this set's list for every form type `overrides` defines.
    #[must_use]
    pub fn overridden_by(mut self, overrides: DefaultFields) -> Self {
        self.lists.extend(overrides.lists);
        self
    }

    #[must_use]
    pub fn get(&self, form_type: &FormType) -> Option<&[FieldConfig]> {
        self.lists.get(form_type).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FormType, &[FieldConfig])> {
        self.lists.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
