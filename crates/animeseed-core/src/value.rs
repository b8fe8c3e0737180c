use std::fmt;

/// A SQL literal, tagged by kind so rendering never has to guess.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Boolean(bool),
    Number(Number),
}

/// Numeric literal payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }

    /// Render as a SQL literal: `NULL`, `'it''s'`, `TRUE`, `42`, `8.5`.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
            SqlValue::Boolean(true) => "TRUE".to_string(),
            SqlValue::Boolean(false) => "FALSE".to_string(),
            SqlValue::Number(number) => number.to_string(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            // Non-finite values are not valid SQL numerics.
            Number::Float(value) if !value.is_finite() => write!(f, "NULL"),
            // Debug keeps the decimal point on whole floats (`7.0`).
            Number::Float(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Number(Number::Int(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Number(Number::Float(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Boolean(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
