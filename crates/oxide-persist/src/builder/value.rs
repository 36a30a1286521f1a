//! SQL literal values.
//!
//! Every included field is turned into a [`SqlValue`] and then rendered
//! inline, since the generated statements carry no placeholders.

/// A field value ready to be rendered as an SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value. Wide enough for every `i64` and `u64`.
    Int(i128),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the inline SQL literal for this value.
    ///
    /// Numbers render unquoted, text is wrapped in single quotes with
    /// embedded quotes doubled.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

/// Types whose values can be stored in a column.
///
/// Implemented for the primitive types a record field usually holds. The
/// `Entity` derive calls this on every field that can end up in an INSERT.
pub trait ToSqlValue {
    /// Reads the value as a `SqlValue`.
    fn to_sql_value(&self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Int(i128::from(*self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl ToSqlValue for isize {
    #[allow(clippy::cast_lossless)]
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int(*self as i128)
    }
}

impl ToSqlValue for usize {
    #[allow(clippy::cast_lossless)]
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int(*self as i128)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl ToSqlValue for char {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for &T {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for Box<T> {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }
}

impl ToSqlValue for [u8] {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

#[cfg(feature = "chrono")]
mod temporal {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    use super::{SqlValue, ToSqlValue};

    impl ToSqlValue for NaiveDate {
        fn to_sql_value(&self) -> SqlValue {
            SqlValue::Text(self.format("%Y-%m-%d").to_string())
        }
    }

    impl ToSqlValue for NaiveDateTime {
        fn to_sql_value(&self) -> SqlValue {
            SqlValue::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }

    impl ToSqlValue for DateTime<Utc> {
        fn to_sql_value(&self) -> SqlValue {
            SqlValue::Text(self.to_rfc3339())
        }
    }
}
