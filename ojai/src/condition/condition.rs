use crate::common::{FieldPath, Value};
use crate::document::Document;
use itertools::Itertools;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Comparison operators of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Op {
    /// Returns `true` for the operators that need an ordered literal.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Op::Equal | Op::NotEqual)
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Op::Equal => ordering == Ordering::Equal,
            Op::NotEqual => ordering != Ordering::Equal,
            Op::Less => ordering == Ordering::Less,
            Op::LessOrEqual => ordering != Ordering::Greater,
            Op::Greater => ordering == Ordering::Greater,
            Op::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Equal => write!(f, "="),
            Op::NotEqual => write!(f, "!="),
            Op::Less => write!(f, "<"),
            Op::LessOrEqual => write!(f, "<="),
            Op::Greater => write!(f, ">"),
            Op::GreaterOrEqual => write!(f, ">="),
        }
    }
}

pub(crate) enum ConditionNode {
    All,
    Compare { field: FieldPath, op: Op, value: Value },
    Exists { field: FieldPath, exists: bool },
    In { field: FieldPath, values: Vec<Value> },
    Matches { field: FieldPath, regex: Regex },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Condition),
}

/// An immutable predicate tree over document fields.
///
/// Conditions are built with a [ConditionBuilder](crate::condition::ConditionBuilder)
/// or composed from other conditions with [Condition::and], [Condition::or]
/// and [Condition::not]. Cloning is cheap; the tree is shared.
///
/// ## Evaluation
///
/// - A missing field satisfies only [Op::NotEqual].
/// - Ordering operators match only when the field value and the literal
///   belong to the same type family (numbers, strings, dates/timestamps).
/// - Integers and doubles compare numerically.
///
/// ```rust
/// use ojai::condition::{ConditionBuilder, Op};
/// use ojai::doc;
///
/// let gold = ConditionBuilder::new().is("support", Op::Equal, "gold").build().unwrap();
/// assert!(gold.evaluate(&doc! { support: "gold" }));
/// assert!(!gold.evaluate(&doc! { support: "silver" }));
/// assert_eq!(gold.to_string(), r#"(support = "gold")"#);
/// ```
#[derive(Clone)]
pub struct Condition {
    inner: Arc<ConditionNode>,
}

impl Condition {
    pub(crate) fn new(node: ConditionNode) -> Condition {
        Condition {
            inner: Arc::new(node),
        }
    }

    /// The condition every document satisfies.
    pub fn all() -> Condition {
        Condition::new(ConditionNode::All)
    }

    /// Returns `true` for the match-all condition.
    pub fn is_empty(&self) -> bool {
        matches!(self.inner.as_ref(), ConditionNode::All)
    }

    pub fn and(self, other: Condition) -> Condition {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Condition::new(ConditionNode::And(vec![self, other]))
    }

    pub fn or(self, other: Condition) -> Condition {
        Condition::new(ConditionNode::Or(vec![self, other]))
    }

    pub fn not(self) -> Condition {
        Condition::new(ConditionNode::Not(self))
    }

    /// Returns `true` if `document` satisfies this condition.
    pub fn evaluate(&self, document: &Document) -> bool {
        match self.inner.as_ref() {
            ConditionNode::All => true,
            ConditionNode::Compare { field, op, value } => match document.get_path(field) {
                None => *op == Op::NotEqual,
                Some(actual) => compare(actual, *op, value),
            },
            ConditionNode::Exists { field, exists } => {
                document.get_path(field).is_some() == *exists
            }
            ConditionNode::In { field, values } => match document.get_path(field) {
                None => false,
                Some(actual) => values.iter().any(|v| v == actual),
            },
            ConditionNode::Matches { field, regex } => document
                .get_path(field)
                .and_then(|v| v.as_str())
                .map(|s| regex.is_match(s))
                .unwrap_or(false),
            ConditionNode::And(conditions) => conditions.iter().all(|c| c.evaluate(document)),
            ConditionNode::Or(conditions) => conditions.iter().any(|c| c.evaluate(document)),
            ConditionNode::Not(condition) => !condition.evaluate(document),
        }
    }
}

fn compare(actual: &Value, op: Op, literal: &Value) -> bool {
    match op {
        Op::Equal => actual == literal,
        Op::NotEqual => actual != literal,
        _ => {
            actual.type_family() == literal.type_family() && op.accepts(actual.cmp(literal))
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::all()
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.inner.as_ref() {
            ConditionNode::All => write!(f, "(true)"),
            ConditionNode::Compare { field, op, value } => {
                write!(f, "({} {} {})", field, op, value)
            }
            ConditionNode::Exists { field, exists } => {
                if *exists {
                    write!(f, "({} exists)", field)
                } else {
                    write!(f, "({} not exists)", field)
                }
            }
            ConditionNode::In { field, values } => {
                write!(f, "({} in [{}])", field, values.iter().join(", "))
            }
            ConditionNode::Matches { field, regex } => {
                write!(f, "({} matches {:?})", field, regex.as_str())
            }
            ConditionNode::And(conditions) => {
                write!(f, "({})", conditions.iter().join(" and "))
            }
            ConditionNode::Or(conditions) => {
                write!(f, "({})", conditions.iter().join(" or "))
            }
            ConditionNode::Not(condition) => write!(f, "(not {})", condition),
        }
    }
}

impl Debug for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Condition{}", self)
    }
}
