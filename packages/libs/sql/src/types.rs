//! 값 타입 카탈로그
//!
//! 바인딩되는 모든 값은 정확히 하나의 [`SqlType`]을 가집니다.
//! 타입이 검증(캐스팅) 규칙과 SQL 리터럴 렌더링 규칙을 모두 결정하며,
//! 값의 런타임 형태만으로는 렌더링 방식이 정해지지 않습니다.
//!
//! # 패밀리
//!
//! - 정수: `tiny`, `small`, `medium`, `int`, `big` → 따옴표 없는 숫자
//! - 실수: `float`, `double`, `decimal` → 따옴표 없는 숫자
//! - 문자열: `char`, `varchar`, `text` → 커넥션 escape 후 `'...'`
//! - 날짜/시간: `timestamp`, `datetime`, `date`, `time`, `year` → 고정 패턴 포맷
//! - 식별자: `table`, `column` → `` `...` `` (escape 하지 않음)

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use quill_core::{Error, Result};

use crate::connection::Escape;

/// 값 타입 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    // 정수
    Tiny,
    Small,
    Medium,
    Int,
    Big,

    // 실수
    Float,
    Double,
    Decimal,

    // 문자열
    Char,
    Varchar,
    Text,

    // 날짜/시간
    Timestamp,
    DateTime,
    Date,
    Time,
    Year,

    // 식별자 (테이블/컬럼 이름)
    Table,
    Column,
}

impl SqlType {
    /// 이름에서 파싱 (`varchar`, `bigint` 등)
    pub fn from_name(name: &str) -> Result<Self> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "tiny" | "tinyint" => SqlType::Tiny,
            "small" | "smallint" => SqlType::Small,
            "medium" | "mediumint" => SqlType::Medium,
            "int" | "integer" => SqlType::Int,
            "big" | "bigint" => SqlType::Big,
            "float" | "real" => SqlType::Float,
            "double" => SqlType::Double,
            "decimal" | "numeric" => SqlType::Decimal,
            "char" => SqlType::Char,
            "varchar" | "string" => SqlType::Varchar,
            "text" => SqlType::Text,
            "timestamp" => SqlType::Timestamp,
            "datetime" => SqlType::DateTime,
            "date" => SqlType::Date,
            "time" => SqlType::Time,
            "year" => SqlType::Year,
            "table" => SqlType::Table,
            "column" => SqlType::Column,
            _ => {
                return Err(Error::UnknownType {
                    name: name.to_string(),
                })
            }
        };
        Ok(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Tiny => "tiny",
            SqlType::Small => "small",
            SqlType::Medium => "medium",
            SqlType::Int => "int",
            SqlType::Big => "big",
            SqlType::Float => "float",
            SqlType::Double => "double",
            SqlType::Decimal => "decimal",
            SqlType::Char => "char",
            SqlType::Varchar => "varchar",
            SqlType::Text => "text",
            SqlType::Timestamp => "timestamp",
            SqlType::DateTime => "datetime",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Year => "year",
            SqlType::Table => "table",
            SqlType::Column => "column",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SqlType::Tiny | SqlType::Small | SqlType::Medium | SqlType::Int | SqlType::Big
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SqlType::Float | SqlType::Double | SqlType::Decimal)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, SqlType::Char | SqlType::Varchar | SqlType::Text)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SqlType::Timestamp | SqlType::DateTime | SqlType::Date | SqlType::Time | SqlType::Year
        )
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, SqlType::Table | SqlType::Column)
    }

    /// 날짜/시간 타입의 고정 포맷 패턴
    ///
    /// `timestamp`는 Unix epoch 정수로 렌더링되므로 패턴이 없습니다.
    pub fn temporal_pattern(&self) -> Option<&'static str> {
        match self {
            SqlType::DateTime => Some("%Y-%m-%d %H:%M:%S"),
            SqlType::Date => Some("%Y-%m-%d"),
            SqlType::Time => Some("%H:%M:%S"),
            SqlType::Year => Some("%Y"),
            _ => None,
        }
    }

    /// 원시 값을 이 타입의 정규 형태로 캐스팅
    fn coerce(self, value: RawValue) -> Result<RawValue> {
        if self.is_identifier() {
            return match value {
                RawValue::Text(s) if !s.is_empty() => Ok(RawValue::Text(s)),
                RawValue::Text(_) => Err(self.mismatch("identifier must not be empty")),
                RawValue::Null => Err(self.mismatch("identifier must not be null")),
                other => Err(self.mismatch(format!(
                    "expected an identifier, got {}",
                    other.kind()
                ))),
            };
        }

        // NULL은 타입별 포맷을 건너뜀
        if value.is_null() {
            return Ok(RawValue::Null);
        }

        if self.is_integer() {
            return match value {
                RawValue::Int(i) => Ok(RawValue::Int(i)),
                RawValue::Bool(b) => Ok(RawValue::Int(b as i64)),
                RawValue::Float(f) if f.is_finite() => Ok(RawValue::Int(f.trunc() as i64)),
                RawValue::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(RawValue::Int)
                    .map_err(|_| self.mismatch(format!("'{}' is not an integer", s))),
                other => Err(self.mismatch(format!("cannot cast {} to integer", other.kind()))),
            };
        }

        if self.is_float() {
            let f = match value {
                RawValue::Int(i) => i as f64,
                RawValue::Float(f) => f,
                RawValue::Bool(b) => f64::from(u8::from(b)),
                RawValue::Text(ref s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| self.mismatch(format!("'{}' is not a number", s)))?,
                other => {
                    return Err(self.mismatch(format!("cannot cast {} to float", other.kind())))
                }
            };
            if !f.is_finite() {
                return Err(self.mismatch("non-finite numbers have no SQL literal"));
            }
            return Ok(RawValue::Float(f));
        }

        if self.is_string() {
            return match value {
                RawValue::Text(s) => Ok(RawValue::Text(s)),
                RawValue::Int(i) => Ok(RawValue::Text(i.to_string())),
                RawValue::Float(f) => Ok(RawValue::Text(f.to_string())),
                RawValue::Bool(b) => Ok(RawValue::Text(u8::from(b).to_string())),
                other => Err(self.mismatch(format!("cannot cast {} to string", other.kind()))),
            };
        }

        // 날짜/시간: 구조화된 값만 허용 (미리 포맷된 문자열 불가)
        match value {
            RawValue::DateTime(dt) => Ok(RawValue::DateTime(dt)),
            other => Err(self.mismatch(format!(
                "expected a date/time value, got {}",
                other.kind()
            ))),
        }
    }

    fn mismatch(self, message: impl Into<String>) -> Error {
        Error::type_mismatch(self.name(), message)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 캐스팅 전 원시 입력 값
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "string",
            RawValue::DateTime(_) => "date/time",
        }
    }
}

macro_rules! raw_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RawValue {
                fn from(v: $t) -> Self {
                    RawValue::Int(i64::from(v))
                }
            }
        )*
    };
}

raw_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for RawValue {
    fn from(v: f32) -> Self {
        RawValue::Float(f64::from(v))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<&String> for RawValue {
    fn from(v: &String) -> Self {
        RawValue::Text(v.clone())
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(v: NaiveDateTime) -> Self {
        RawValue::DateTime(v)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(v: NaiveDate) -> Self {
        RawValue::DateTime(v.and_time(NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(v: DateTime<Utc>) -> Self {
        RawValue::DateTime(v.naive_utc())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Null)
    }
}

/// 타입이 지정된 값
///
/// 생성 시점에 타입 규칙에 따라 캐스팅/검증되므로, 렌더링은 실패하지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    ty: SqlType,
    value: RawValue,
}

impl TypedValue {
    /// 값 바인딩
    ///
    /// - 식별자 타입은 NULL/빈 문자열을 거부합니다.
    /// - 날짜/시간 타입은 구조화된 날짜 값만 받습니다.
    pub fn new(ty: SqlType, value: impl Into<RawValue>) -> Result<Self> {
        let value = ty.coerce(value.into())?;
        Ok(Self { ty, value })
    }

    pub fn ty(&self) -> SqlType {
        self.ty
    }

    /// 캐스팅된 값
    pub fn value(&self) -> &RawValue {
        &self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// SQL 리터럴로 렌더링
    ///
    /// 문자열 패밀리만 `escaper`를 거칩니다. 식별자는 backtick으로 감싸기만 합니다.
    pub fn render(&self, escaper: &dyn Escape) -> String {
        match &self.value {
            RawValue::Null => "NULL".to_string(),
            RawValue::Bool(b) => u8::from(*b).to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) if self.ty.is_identifier() => format!("`{}`", s),
            RawValue::Text(s) => format!("'{}'", escaper.escape_string(s)),
            RawValue::DateTime(dt) => match self.ty.temporal_pattern() {
                Some(pattern) => format!("'{}'", dt.format(pattern)),
                None => dt.and_utc().timestamp().to_string(),
            },
        }
    }
}
