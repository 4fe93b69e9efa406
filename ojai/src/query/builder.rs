use crate::common::FieldPath;
use crate::condition::Condition;
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use crate::query::Query;
use indexmap::IndexSet;

/// Fluent builder for [Query] descriptors.
///
/// [select](Self::select) may be called repeatedly; the projection
/// accumulates in first-seen order and duplicates collapse. Omitting it
/// returns every field. The first error is captured and returned from
/// [build](Self::build).
///
/// ```rust
/// use ojai::condition::{ConditionBuilder, Op};
/// use ojai::query::QueryBuilder;
///
/// let gold = ConditionBuilder::new().is("support", Op::Equal, "gold").build().unwrap();
/// let query = QueryBuilder::new()
///     .select(["name", "yelping_since", "support"])
///     .where_condition(gold)
///     .build()
///     .unwrap();
/// assert_eq!(
///     query.to_string(),
///     r#"select name, yelping_since, support where (support = "gold")"#
/// );
/// ```
#[derive(Clone, Default)]
pub struct QueryBuilder {
    projection: IndexSet<FieldPath>,
    condition: Option<Condition>,
    limit: Option<usize>,
    error: Option<OjaiError>,
}

impl QueryBuilder {
    pub fn new() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Adds fields to the projection.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.error.is_some() {
            return self;
        }

        for field in fields {
            let field = field.as_ref();
            match FieldPath::parse(field) {
                Ok(path) => {
                    self.projection.insert(path);
                }
                Err(e) => {
                    log::error!("Invalid projection field '{}'", field);
                    self.error = Some(OjaiError::new_with_cause(
                        &format!("Invalid projection field '{}'", field),
                        ErrorKind::QueryError,
                        e,
                    ));
                    return self;
                }
            }
        }
        self
    }

    /// Sets the root condition, replacing any previous one.
    pub fn where_condition(mut self, condition: Condition) -> Self {
        if self.error.is_none() {
            self.condition = Some(condition);
        }
        self
    }

    /// Caps the number of documents a stream over this query yields.
    pub fn limit(mut self, limit: usize) -> Self {
        if self.error.is_some() {
            return self;
        }

        if limit == 0 {
            log::error!("Query limit must be greater than zero");
            self.error = Some(OjaiError::new(
                "Query limit must be greater than zero",
                ErrorKind::QueryError,
            ));
        } else {
            self.limit = Some(limit);
        }
        self
    }

    pub fn build(self) -> OjaiResult<Query> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(Query::new(
            self.projection.into_iter().collect(),
            self.condition.unwrap_or_default(),
            self.limit,
        ))
    }
}
