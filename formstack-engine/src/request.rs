//! Transport-neutral view of an incoming record request.

/// Key of the discriminator field create requests carry.
pub const FORM_TYPE_KEY: &str = "formType";

/// One uploaded file, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Multipart field name the file arrived under.
    pub slot: String,
    /// Client-supplied filename. Never used as a storage key.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(slot: &str, filename: &str, content_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: slot.into(),
            filename: filename.into(),
            content_type: content_type.map(Into::into),
            bytes: bytes.into(),
        }
    }
}

/// Text fields and files of a multipart or JSON request, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl RawRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.push_field(name, value);
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.push_file(file);
        self
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Value of a text field. When a name repeats, the last value wins.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The form type discriminator, if the request carries one.
    #[must_use]
    pub fn form_type(&self) -> Option<&str> {
        self.text(FORM_TYPE_KEY)
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }
}
