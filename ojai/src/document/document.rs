use im::OrdMap;
use smallvec::SmallVec;

use crate::common::{FieldPath, Value, DOC_ID, FIELD_SEPARATOR};
use crate::document::DocumentBuilder;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use chrono::NaiveDate;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// An immutable, schema-flexible record keyed by a string identifier.
///
/// A document maps field names to [Value]s. Values may themselves be
/// documents, which makes dotted [FieldPath]s such as `address.city`
/// addressable. The identifier lives in the reserved `_id` field and is set
/// through [DocumentBuilder::set_id].
///
/// Documents are built once with a [DocumentBuilder] and never mutated
/// afterwards; [Document::to_builder] starts a new document from an
/// existing one.
///
/// ## Persistent storage
///
/// Fields are kept in an `im::OrdMap`:
/// - O(1) clone via internal structural sharing, so handing a document to a
///   store or a stream never deep-copies it
/// - iteration is always in field-name order, which is what makes the JSON
///   rendering canonical
#[derive(Clone, Eq, PartialEq, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Starts building a new document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Parses a JSON object into a document. A string `_id` member becomes
    /// the identifier.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::EncodingError] if the text is not a JSON
    /// object, its `_id` member is not a non-empty string, or any member
    /// name (at any depth) is empty or contains a `.`.
    ///
    /// ```rust
    /// use ojai::document::Document;
    ///
    /// let doc = Document::from_json(r#"{"_id": "u1", "fans": 2}"#).unwrap();
    /// assert_eq!(doc.id(), Some("u1"));
    /// assert_eq!(doc.get_int("fans"), Some(2));
    ///
    /// assert!(Document::from_json(r#"{"a.b": 1}"#).is_err());
    /// ```
    pub fn from_json(text: &str) -> OjaiResult<Document> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        match json {
            serde_json::Value::Object(map) => {
                match map.get(DOC_ID) {
                    Some(serde_json::Value::String(id)) if !id.is_empty() => {}
                    Some(id) => {
                        log::error!("Document id must be a non-empty string, found {}", id);
                        return Err(OjaiError::new(
                            &format!("Document id must be a non-empty string, found {}", id),
                            ErrorKind::EncodingError,
                        ));
                    }
                    None => {}
                }
                Document::from_json_map(map)
            }
            other => {
                log::error!("Expected a JSON object, found {}", other);
                Err(OjaiError::new(
                    "Expected a JSON object for a document",
                    ErrorKind::EncodingError,
                ))
            }
        }
    }

    pub(crate) fn from_json_map(
        map: serde_json::Map<String, serde_json::Value>,
    ) -> OjaiResult<Document> {
        let mut data = OrdMap::new();
        for (key, value) in map {
            if key.is_empty() || key.contains(FIELD_SEPARATOR) {
                log::error!("Invalid field name '{}' in JSON document", key);
                return Err(OjaiError::new(
                    &format!("Invalid field name '{}' in JSON document", key),
                    ErrorKind::EncodingError,
                ));
            }
            data.insert(key, Value::from_json(value)?);
        }
        Ok(Document { data })
    }

    /// Returns the identifier, if one was set.
    pub fn id(&self) -> Option<&str> {
        self.data.get(DOC_ID).and_then(|v| v.as_str())
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    /// Returns the value at `path`, or `None` if the path is invalid or absent.
    ///
    /// ```rust
    /// use ojai::doc;
    ///
    /// let doc = doc! { address: { city: "Paris" } };
    /// assert_eq!(doc.get("address.city").unwrap().as_str(), Some("Paris"));
    /// assert!(doc.get("address.zip").is_none());
    /// ```
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = FieldPath::parse(path).ok()?;
        self.get_path(&path)
    }

    /// Returns the value at an already parsed path.
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let mut current = self;
        let segments = path.segments();
        for (index, segment) in segments.iter().enumerate() {
            let value = current.data.get(segment)?;
            if index == segments.len() - 1 {
                return Some(value);
            }
            current = value.as_document()?;
        }
        None
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str()).map(str::to_string)
    }

    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_int)
    }

    pub fn get_double(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_double)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_date(&self, path: &str) -> Option<NaiveDate> {
        self.get(path).and_then(|v| v.as_date()).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Retrieves all leaf field paths (top level and embedded), excluding `_id`.
    ///
    /// ```rust
    /// use ojai::doc;
    ///
    /// let doc = doc! { _id: "u1", name: "Alice", address: { city: "Paris" } };
    /// let fields = doc.fields();
    /// assert_eq!(fields.as_slice(), &["address.city".to_string(), "name".to_string()]);
    /// ```
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Number of top-level fields, the identifier included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates top-level `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Starts a new builder pre-populated with this document's fields.
    pub fn to_builder(&self) -> DocumentBuilder {
        DocumentBuilder::from_document(self.clone())
    }

    /// Converts the document into a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Renders the canonical compact JSON form of this document.
    ///
    /// Keys are emitted in lexicographic order at every nesting level, so two
    /// documents with the same fields render identically regardless of the
    /// order the fields were set in. This is a diagnostic rendering, not a
    /// wire format.
    ///
    /// ```rust
    /// use ojai::document::Document;
    ///
    /// let doc = Document::builder()
    ///     .set_id("u1")
    ///     .set("support", "gold")
    ///     .set("fans", 2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(doc.as_json_string(), r#"{"_id":"u1","fans":2,"support":"gold"}"#);
    /// ```
    pub fn as_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Renders the canonical JSON form with indentation.
    pub fn as_pretty_json_string(&self) -> String {
        format!("{:#}", self.to_json())
    }

    pub(crate) fn put(&mut self, path: &FieldPath, value: Value) {
        self.data = Self::put_in(&self.data, path.segments(), value);
    }

    pub(crate) fn remove(&mut self, path: &FieldPath) {
        self.data = Self::remove_in(&self.data, path.segments());
    }

    /// Copies the identifier and every addressed path into a new document.
    /// Paths that do not resolve are skipped.
    pub(crate) fn select(&self, paths: &[FieldPath]) -> Document {
        let mut projected = Document::default();
        if let Some(id) = self.data.get(DOC_ID) {
            projected.data.insert(DOC_ID.to_string(), id.clone());
        }
        for path in paths {
            if let Some(value) = self.get_path(path) {
                projected.put(path, value.clone());
            }
        }
        projected
    }

    fn put_in(data: &OrdMap<String, Value>, segments: &[String], value: Value) -> OrdMap<String, Value> {
        let key = &segments[0];
        if segments.len() == 1 {
            return data.update(key.clone(), value);
        }

        // if the current level value is not a document, replace it with one
        let nested = match data.get(key) {
            Some(Value::Document(doc)) => doc.data.clone(),
            _ => OrdMap::new(),
        };
        let nested = Self::put_in(&nested, &segments[1..], value);
        data.update(key.clone(), Value::Document(Document { data: nested }))
    }

    fn remove_in(data: &OrdMap<String, Value>, segments: &[String]) -> OrdMap<String, Value> {
        let key = &segments[0];
        if segments.len() == 1 {
            return data.without(key);
        }

        match data.get(key) {
            Some(Value::Document(doc)) => {
                let nested = Self::remove_in(&doc.data, &segments[1..]);
                data.update(key.clone(), Value::Document(Document { data: nested }))
            }
            _ => data.clone(),
        }
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();

        for (key, value) in self.data.iter() {
            if prefix.is_empty() && key == DOC_ID {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            match value {
                Value::Document(doc) if !doc.is_empty() => {
                    fields.append(&mut doc.get_fields_internal(&field));
                }
                _ => fields.push(field),
            }
        }
        fields
    }

    fn to_debug_string(&self) -> String {
        let entries = self
            .data
            .iter()
            .map(|(k, v)| format!("{:?}: {:?}", k, v))
            .collect::<Vec<_>>();
        format!("{{{}}}", entries.join(", "))
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_json_string())
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = im::ordmap::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax. A string `_id` entry becomes
/// the identifier.
///
/// # Panics
///
/// Panics if a key is not a valid field path. Use [DocumentBuilder] where
/// keys come from untrusted input.
///
/// # Examples
///
/// ```rust
/// use ojai::doc;
///
/// let user = doc! {
///     _id: "fdoe-1",
///     name: "fredDoe",
///     fans: 2,
///     address: { city: "Paris" },
///     tags: ["a", "b"],
/// };
/// assert_eq!(user.id(), Some("fdoe-1"));
/// assert_eq!(user.get_string("address.city"), Some("Paris".to_string()));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::document::Document::default()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let builder = $crate::document::DocumentBuilder::new();
            $(
                let builder = builder.set_entry(
                    &$crate::document::normalize(stringify!($key)),
                    $crate::doc_value!($value),
                );
            )*
            builder.build().expect("Failed to build document from doc! literal")
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    // a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // any expression
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
