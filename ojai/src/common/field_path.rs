use crate::common::{DOC_ID, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

type Segments = SmallVec<[String; 4]>;

/// A parsed, dot-separated path to a (possibly nested) document field.
///
/// `address.city` addresses the `city` field of the document stored in the
/// `address` field. Paths are validated once at parse time, so every
/// consumer can rely on a non-empty list of non-empty segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FieldPath {
    segments: Segments,
}

impl FieldPath {
    /// Parses a field path.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidFieldPath] if the path is empty or has an
    /// empty segment (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(path: &str) -> OjaiResult<FieldPath> {
        if path.is_empty() {
            log::error!("Field path cannot be empty");
            return Err(OjaiError::new(
                "Field path cannot be empty",
                ErrorKind::InvalidFieldPath,
            ));
        }

        let mut segments = Segments::new();
        for segment in path.split(FIELD_SEPARATOR) {
            if segment.is_empty() {
                log::error!("Field path '{}' contains an empty segment", path);
                return Err(OjaiError::new(
                    &format!("Field path '{}' contains an empty segment", path),
                    ErrorKind::InvalidFieldPath,
                ));
            }
            segments.push(segment.to_string());
        }
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, i.e. the top-level field this path starts in.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// The last segment, i.e. the field name inside its parent document.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Returns `true` if this path addresses the document identifier.
    pub fn is_id(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOC_ID
    }

    /// Returns `true` if `self` is `other` or an ancestor of `other`.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(other.segments.iter()).all(|(a, b)| a == b)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(&FIELD_SEPARATOR.to_string()))
    }
}

impl FromStr for FieldPath {
    type Err = OjaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}
