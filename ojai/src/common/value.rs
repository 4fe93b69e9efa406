use crate::document::Document;
use crate::errors::OjaiResult;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Compare an integer with a double exactly, without rounding the integer
/// through `f64`. NaN sorts after every integer.
fn num_cmp_int_float(i: i64, d: f64) -> Ordering {
    // 2^63, the first double past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if d.is_nan() || d >= LIMIT {
        return Ordering::Less;
    }
    if d < -LIMIT {
        return Ordering::Greater;
    }

    let whole = d.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&d).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

/// Compare two floats with proper NaN and total ordering.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Ordering {
    // NaN sorts after every other number
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// A dynamically typed field value of a [Document].
///
/// Field values are a closed sum type, so code that consumes a document
/// matches on the variant instead of inspecting types at runtime.
///
/// # Usage
/// ```rust
/// use ojai::common::Value;
///
/// let fans: Value = 2.into();
/// let name = Value::from("fredDoe");
/// assert_eq!(fans.as_int(), Some(2));
/// assert_eq!(name.as_str(), Some("fredDoe"));
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer. Every Rust integer up to 32 bits widens into it.
    Int(i64),
    /// 64-bit floating point value.
    Double(f64),
    /// UTF-8 text.
    String(String),
    /// Calendar date without time zone.
    Date(NaiveDate),
    /// Instant in UTC.
    Timestamp(DateTime<Utc>),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Nested document.
    Document(Document),
}

/// Coarse grouping of [Value] variants used for ordering and for validating
/// comparison conditions. Values of different families never compare as
/// equal and are ordered by family rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum TypeFamily {
    Null,
    Bool,
    Number,
    String,
    Temporal,
    Array,
    Document,
}

impl TypeFamily {
    /// Families whose values have a meaningful ordering for `<`, `<=`, `>`, `>=`.
    pub(crate) fn is_orderable(&self) -> bool {
        matches!(
            self,
            TypeFamily::Number | TypeFamily::String | TypeFamily::Temporal
        )
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric. Integers are widened.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Value::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// Name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Document(_) => "document",
        }
    }

    pub(crate) fn type_family(&self) -> TypeFamily {
        match self {
            Value::Null => TypeFamily::Null,
            Value::Bool(_) => TypeFamily::Bool,
            Value::Int(_) | Value::Double(_) => TypeFamily::Number,
            Value::String(_) => TypeFamily::String,
            Value::Date(_) | Value::Timestamp(_) => TypeFamily::Temporal,
            Value::Array(_) => TypeFamily::Array,
            Value::Document(_) => TypeFamily::Document,
        }
    }

    /// Converts the value into its JSON form. Dates and timestamps render as
    /// ISO-8601 strings; non-finite doubles have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Double(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => {
                serde_json::Value::String(v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(v) => serde_json::Value::Array(v.iter().map(Value::to_json).collect()),
            Value::Document(v) => v.to_json(),
        }
    }

    /// Builds a value from parsed JSON. Integral numbers that fit in `i64`
    /// become [Value::Int], every other number becomes [Value::Double].
    ///
    /// # Errors
    ///
    /// Fails with [EncodingError](crate::errors::ErrorKind::EncodingError) if a nested object has an
    /// empty or dotted member name.
    pub fn from_json(json: serde_json::Value) -> OjaiResult<Value> {
        let value = match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(v) => Value::String(v),
            serde_json::Value::Array(v) => Value::Array(
                v.into_iter()
                    .map(Value::from_json)
                    .collect::<OjaiResult<Vec<Value>>>()?,
            ),
            serde_json::Value::Object(map) => Value::Document(Document::from_json_map(map)?),
        };
        Ok(value)
    }

    fn temporal_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub(crate) fn to_debug_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => format!("bool({})", v),
            Value::Int(v) => format!("int({})", v),
            Value::Double(v) => format!("double({})", v),
            Value::String(v) => format!("string({:?})", v),
            Value::Date(v) => format!("date({})", v),
            Value::Timestamp(v) => format!("timestamp({})", v.to_rfc3339()),
            Value::Array(v) => format!(
                "array([{}])",
                v.iter().map(Value::to_debug_string).collect::<Vec<_>>().join(", ")
            ),
            Value::Document(v) => format!("document({:?})", v),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => num_eq_float(*a, *b),
            (Value::Int(a), Value::Double(b)) | (Value::Double(b), Value::Int(a)) => {
                num_cmp_int_float(*a, *b) == Ordering::Equal
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let (family, other_family) = (self.type_family(), other.type_family());
        if family != other_family {
            return family.cmp(&other_family);
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => num_cmp_float(*a, *b),
            (Value::Int(a), Value::Double(b)) => num_cmp_int_float(*a, *b),
            (Value::Double(a), Value::Int(b)) => num_cmp_int_float(*b, *a).reverse(),
            (a, b) if family == TypeFamily::Temporal => {
                // a date is midnight UTC of that day; ties break date-first
                match a.temporal_instant().cmp(&b.temporal_instant()) {
                    Ordering::Equal => matches!(a, Value::Timestamp(_)).cmp(&matches!(b, Value::Timestamp(_))),
                    ordering => ordering,
                }
            }
            _ => Ordering::Equal,
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64);

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Double(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    #[inline]
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    #[inline]
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Document> for Value {
    #[inline]
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A macro to create a `Value` from a given expression.
///
/// ```rust
/// use ojai::common::Value;
/// use ojai::val;
///
/// assert_eq!(val!(42), Value::Int(42));
/// assert_eq!(val!("gold"), Value::String("gold".to_string()));
/// ```
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
