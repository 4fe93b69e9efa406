use crate::common::{FieldPath, Value};
use crate::condition::{Condition, ConditionNode, Op};
use crate::errors::{ErrorKind, OjaiError, OjaiResult};
use regex::Regex;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Junction {
    And,
    Or,
}

#[derive(Clone)]
struct Block {
    junction: Junction,
    children: Vec<Condition>,
}

impl Block {
    fn new(junction: Junction) -> Block {
        Block {
            junction,
            children: Vec::new(),
        }
    }

    fn into_condition(self) -> Condition {
        let mut children = self.children;
        // match-all is the identity of `and`, but absorbs an `or`
        if self.junction == Junction::And {
            children.retain(|child| !child.is_empty());
        }
        match children.len() {
            0 => Condition::all(),
            1 => children.remove(0),
            _ => match self.junction {
                Junction::And => Condition::new(ConditionNode::And(children)),
                Junction::Or => Condition::new(ConditionNode::Or(children)),
            },
        }
    }
}

/// Fluent builder for [Condition] trees.
///
/// Leaf predicates added at the top level are combined with `and`. Nested
/// blocks are opened with [ConditionBuilder::and] or [ConditionBuilder::or]
/// and ended with [ConditionBuilder::close]. As with the document builder,
/// the first validation error is captured and returned from
/// [ConditionBuilder::build].
///
/// ```rust
/// use ojai::condition::{ConditionBuilder, Op};
/// use ojai::doc;
///
/// // support = "gold" and (fans > 10 or name = "fredDoe")
/// let condition = ConditionBuilder::new()
///     .is("support", Op::Equal, "gold")
///     .or()
///         .is("fans", Op::Greater, 10)
///         .is("name", Op::Equal, "fredDoe")
///     .close()
///     .build()
///     .unwrap();
///
/// assert!(condition.evaluate(&doc! { support: "gold", name: "fredDoe", fans: 2 }));
/// assert!(!condition.evaluate(&doc! { support: "gold", name: "other", fans: 2 }));
/// ```
#[derive(Clone)]
pub struct ConditionBuilder {
    blocks: Vec<Block>,
    error: Option<OjaiError>,
}

impl Default for ConditionBuilder {
    fn default() -> Self {
        ConditionBuilder::new()
    }
}

impl ConditionBuilder {
    pub fn new() -> ConditionBuilder {
        ConditionBuilder {
            blocks: vec![Block::new(Junction::And)],
            error: None,
        }
    }

    /// Adds a `field <op> value` predicate.
    ///
    /// Ordering operators are rejected for `null`, boolean, array and
    /// document literals, which have no meaningful order.
    pub fn is(self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.push_with(field, |field| {
            if op.is_ordering() && !value.type_family().is_orderable() {
                log::error!(
                    "Operator {} cannot be applied to a {} value on field {}",
                    op,
                    value.type_name(),
                    field
                );
                return Err(OjaiError::new(
                    &format!(
                        "Operator {} cannot be applied to a {} value on field {}",
                        op,
                        value.type_name(),
                        field
                    ),
                    ErrorKind::InvalidCondition,
                ));
            }
            Ok(ConditionNode::Compare { field, op, value })
        })
    }

    pub fn exists(self, field: &str) -> Self {
        self.push_with(field, |field| Ok(ConditionNode::Exists { field, exists: true }))
    }

    pub fn not_exists(self, field: &str) -> Self {
        self.push_with(field, |field| Ok(ConditionNode::Exists { field, exists: false }))
    }

    /// Adds a predicate matching when the field equals any of `values`.
    pub fn in_values<T: Into<Value>>(self, field: &str, values: Vec<T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.push_with(field, |field| {
            if values.is_empty() {
                log::error!("In condition on field {} has no values", field);
                return Err(OjaiError::new(
                    &format!("In condition on field {} has no values", field),
                    ErrorKind::InvalidCondition,
                ));
            }
            Ok(ConditionNode::In { field, values })
        })
    }

    /// Adds a predicate matching string fields against a regular expression.
    pub fn matches(self, field: &str, pattern: &str) -> Self {
        self.push_with(field, |field| {
            let regex = Regex::new(pattern).map_err(|e| {
                log::error!("Invalid regular expression {} on field {}: {}", pattern, field, e);
                OjaiError::from(e)
            })?;
            Ok(ConditionNode::Matches { field, regex })
        })
    }

    /// Opens a block whose predicates must all match.
    pub fn and(self) -> Self {
        self.open(Junction::And)
    }

    /// Opens a block where any predicate may match.
    pub fn or(self) -> Self {
        self.open(Junction::Or)
    }

    /// Ends the innermost block opened by [and](Self::and) or [or](Self::or).
    pub fn close(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }

        if self.blocks.len() < 2 {
            log::error!("close() called without an open block");
            self.error = Some(OjaiError::new(
                "close() called without an open block",
                ErrorKind::InvalidCondition,
            ));
            return self;
        }

        if let Some(block) = self.blocks.pop() {
            if block.children.is_empty() {
                log::error!("Condition block {:?} is empty", block.junction);
                self.error = Some(OjaiError::new(
                    &format!("Condition block {:?} is empty", block.junction),
                    ErrorKind::InvalidCondition,
                ));
                return self;
            }
            let condition = block.into_condition();
            self.push(condition);
        }
        self
    }

    /// Adds a prebuilt condition to the current block.
    pub fn condition(mut self, condition: Condition) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.push(condition);
        self
    }

    /// Finalizes the condition. An empty builder yields the match-all
    /// condition.
    ///
    /// # Errors
    ///
    /// Returns the first captured validation error, or
    /// [ErrorKind::InvalidCondition] if a block was left open.
    pub fn build(mut self) -> OjaiResult<Condition> {
        if let Some(error) = self.error {
            return Err(error);
        }

        if self.blocks.len() != 1 {
            log::error!("{} condition block(s) left open", self.blocks.len() - 1);
            return Err(OjaiError::new(
                &format!("{} condition block(s) left open", self.blocks.len() - 1),
                ErrorKind::InvalidCondition,
            ));
        }

        match self.blocks.pop() {
            Some(root) => Ok(root.into_condition()),
            None => Ok(Condition::all()),
        }
    }

    fn open(mut self, junction: Junction) -> Self {
        if self.error.is_none() {
            self.blocks.push(Block::new(junction));
        }
        self
    }

    fn push(&mut self, condition: Condition) {
        if let Some(block) = self.blocks.last_mut() {
            block.children.push(condition);
        }
    }

    fn push_with<F>(mut self, field: &str, make: F) -> Self
    where
        F: FnOnce(FieldPath) -> OjaiResult<ConditionNode>,
    {
        if self.error.is_some() {
            return self;
        }

        let result = FieldPath::parse(field)
            .map_err(|e| {
                OjaiError::new_with_cause(
                    &format!("Invalid field '{}' in condition", field),
                    ErrorKind::InvalidCondition,
                    e,
                )
            })
            .and_then(make);

        match result {
            Ok(node) => self.push(Condition::new(node)),
            Err(e) => self.error = Some(e),
        }
        self
    }
}
