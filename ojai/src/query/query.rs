use crate::common::FieldPath;
use crate::condition::Condition;
use crate::document::Document;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// An immutable query descriptor: a projection, a root condition and an
/// optional result limit.
///
/// A query is built once with a [QueryBuilder](crate::query::QueryBuilder)
/// and may be executed any number of times, against any store. Cloning is
/// cheap.
#[derive(Clone, Debug)]
pub struct Query {
    inner: Arc<QueryInner>,
}

#[derive(Debug)]
struct QueryInner {
    projection: Vec<FieldPath>,
    condition: Condition,
    limit: Option<usize>,
}

impl Query {
    pub(crate) fn new(projection: Vec<FieldPath>, condition: Condition, limit: Option<usize>) -> Query {
        Query {
            inner: Arc::new(QueryInner {
                projection,
                condition,
                limit,
            }),
        }
    }

    /// A query returning every field of every document.
    pub fn all() -> Query {
        Query::new(Vec::new(), Condition::all(), None)
    }

    /// Projected field paths. Empty means all fields.
    pub fn projection(&self) -> &[FieldPath] {
        &self.inner.projection
    }

    pub fn condition(&self) -> &Condition {
        &self.inner.condition
    }

    pub fn limit(&self) -> Option<usize> {
        self.inner.limit
    }

    pub fn has_projection(&self) -> bool {
        !self.inner.projection.is_empty()
    }

    /// Returns `true` if `document` satisfies the query condition.
    pub fn matches(&self, document: &Document) -> bool {
        self.inner.condition.evaluate(document)
    }

    /// Applies the projection to `document`. The identifier is always kept;
    /// selected paths absent from the document are skipped.
    ///
    /// ```rust
    /// use ojai::doc;
    /// use ojai::query::QueryBuilder;
    ///
    /// let query = QueryBuilder::new().select(["a", "c"]).build().unwrap();
    /// let projected = query.project(&doc! { _id: "k", a: 1, b: 2, c: 3 });
    /// assert_eq!(projected.as_json_string(), r#"{"_id":"k","a":1,"c":3}"#);
    /// ```
    pub fn project(&self, document: &Document) -> Document {
        if self.inner.projection.is_empty() {
            document.clone()
        } else {
            document.select(&self.inner.projection)
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.inner.projection.is_empty() {
            write!(f, "select *")?;
        } else {
            write!(f, "select {}", self.inner.projection.iter().join(", "))?;
        }
        if !self.inner.condition.is_empty() {
            write!(f, " where {}", self.inner.condition)?;
        }
        if let Some(limit) = self.inner.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}

impl Default for Query {
    fn default() -> Self {
        Query::all()
    }
}
