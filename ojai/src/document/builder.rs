use crate::common::{FieldPath, Value, DOC_ID};
use crate::document::Document;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};

/// Fluent builder for immutable [Document]s.
///
/// Every setter consumes and returns the builder so calls chain. Invalid
/// input does not break the chain: the first error is captured and
/// returned from [DocumentBuilder::build], later calls are ignored.
///
/// # Examples
///
/// ```rust
/// use ojai::document::DocumentBuilder;
///
/// let doc = DocumentBuilder::new()
///     .set_id("fdoe-1")
///     .set("name", "fredDoe")
///     .set("address.city", "Paris")
///     .build()
///     .unwrap();
/// assert_eq!(doc.get_string("address.city"), Some("Paris".to_string()));
///
/// let err = DocumentBuilder::new().set("a..b", 1).build().unwrap_err();
/// assert_eq!(err.kind(), &ojai::errors::ErrorKind::InvalidFieldPath);
/// ```
#[derive(Clone, Default)]
pub struct DocumentBuilder {
    document: Document,
    error: Option<OjaiError>,
}

impl DocumentBuilder {
    pub fn new() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub(crate) fn from_document(document: Document) -> DocumentBuilder {
        DocumentBuilder {
            document,
            error: None,
        }
    }

    /// Sets the identifier. Setting it again replaces the previous value.
    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let id = id.into();
        if id.is_empty() {
            log::error!("Document id cannot be empty");
            self.error = Some(OjaiError::new(
                "Document id cannot be empty",
                ErrorKind::WriteError,
            ));
            return self;
        }

        if let Some(previous) = self.document.id() {
            log::warn!("Document id '{}' is replaced with '{}'", previous, id);
        }
        self.put_id(id);
        self
    }

    /// Adds or overwrites the field at `path`. Dotted paths create the
    /// intermediate documents they pass through.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }

        match Self::parse_writable(path) {
            Ok(path) => self.document.put(&path, value.into()),
            Err(e) => self.error = Some(e),
        }
        self
    }

    pub fn set_null(self, path: &str) -> Self {
        self.set(path, Value::Null)
    }

    /// Removes the field at `path`, if present.
    pub fn remove(mut self, path: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match Self::parse_writable(path) {
            Ok(path) => self.document.remove(&path),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Copies every field of `other` into this builder. Nested documents
    /// present on both sides are merged recursively; the identifier of
    /// `other` is ignored.
    pub fn merge(mut self, other: &Document) -> Self {
        if self.error.is_some() {
            return self;
        }

        for (key, value) in other.iter() {
            if key == DOC_ID {
                continue;
            }
            // keys of a built document are valid single segments
            let path = match FieldPath::parse(key) {
                Ok(path) => path,
                Err(e) => {
                    self.error = Some(e);
                    return self;
                }
            };
            let merged = match (self.document.get_path(&path), value) {
                (Some(Value::Document(mine)), Value::Document(theirs)) => {
                    match mine.to_builder().merge(theirs).build() {
                        Ok(doc) => Value::Document(doc),
                        Err(e) => {
                            self.error = Some(e);
                            return self;
                        }
                    }
                }
                _ => value.clone(),
            };
            self.document.put(&path, merged);
        }
        self
    }

    /// Sets one `key: value` entry of a `doc!` literal. A string value under
    /// `_id` becomes the identifier.
    #[doc(hidden)]
    pub fn set_entry(self, key: &str, value: Value) -> Self {
        if key == DOC_ID {
            if let Value::String(id) = value {
                return self.set_id(id);
            }
        }
        self.set(key, value)
    }

    /// Finalizes the document.
    ///
    /// # Errors
    ///
    /// Returns the first error captured by a previous call.
    pub fn build(self) -> OjaiResult<Document> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.document)
    }

    fn put_id(&mut self, id: String) {
        // `_id` is a single valid segment
        if let Ok(path) = FieldPath::parse(DOC_ID) {
            self.document.put(&path, Value::String(id));
        }
    }

    fn parse_writable(path: &str) -> OjaiResult<FieldPath> {
        let path = FieldPath::parse(path)?;
        if path.is_id() {
            log::error!("Document id can only be set with set_id");
            return Err(OjaiError::new(
                "Document id can only be set with set_id",
                ErrorKind::InvalidFieldPath,
            ));
        }
        Ok(path)
    }
}
