//! CRUD 문장 빌더
//!
//! 각 빌더는 절(clause)을 누적한 뒤 `assemble()`로 [`Query`]를 만듭니다.
//! 조립은 고정된 순서로 절을 훑으며 식별자와 값을 하나씩 바인딩하고,
//! 반환된 위치의 `%(i)` 토큰을 템플릿에 이어 붙입니다.
//!
//! # 조립 순서
//!
//! - SELECT: 컬럼 → 테이블 → WHERE → ORDER BY → LIMIT → OFFSET
//! - INSERT: 테이블 → (컬럼, 값) 쌍
//! - UPDATE: 테이블 → (컬럼, 값) 쌍 → WHERE → LIMIT
//! - DELETE: 테이블 → WHERE → LIMIT
//!
//! WHERE 조건은 항상 `&&`로 연결된 평면 AND입니다 (OR, 괄호 그룹 없음).

mod delete;
mod insert;
mod select;
mod update;

use std::fmt;

use quill_core::{Error, Result};

use crate::query::{placeholder, Query};
use crate::types::{RawValue, SqlType};

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// 같음 (기본)
    Eq,
    /// 같지 않음
    Ne,
    /// 보다 작음
    Lt,
    /// 보다 작거나 같음
    Le,
    /// 보다 큼
    Gt,
    /// 보다 크거나 같음
    Ge,
}

impl Operator {
    /// 기호 또는 이름에서 파싱 (`>=`, `$gte` 등)
    pub fn from_symbol(s: &str) -> Result<Self> {
        match s.trim() {
            "=" | "==" | "$eq" => Ok(Operator::Eq),
            "!=" | "<>" | "$ne" => Ok(Operator::Ne),
            "<" | "$lt" => Ok(Operator::Lt),
            "<=" | "$lte" => Ok(Operator::Le),
            ">" | "$gt" => Ok(Operator::Gt),
            ">=" | "$gte" => Ok(Operator::Ge),
            other => Err(Error::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// NULL 값과 비교할 때의 SQL
    ///
    /// `= NULL`은 항상 참이 아니므로 `IS` / `IS NOT`으로 바꿉니다.
    fn as_sql_for(&self, value: &RawValue) -> &'static str {
        match (self, value.is_null()) {
            (Operator::Eq, true) => "IS",
            (Operator::Ne, true) => "IS NOT",
            _ => self.as_sql(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// WHERE 조건 하나
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub ty: SqlType,
    pub value: RawValue,
    pub operator: Operator,
}

impl Condition {
    pub fn new(
        column: impl Into<String>,
        ty: SqlType,
        value: impl Into<RawValue>,
        operator: Operator,
    ) -> Self {
        Self {
            column: column.into(),
            ty,
            value: value.into(),
            operator,
        }
    }
}

/// ORDER BY 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub descending: bool,
}

/// 삽입 순서를 유지하는 컬럼 → 값 목록
///
/// 같은 컬럼을 다시 지정하면 원래 위치에서 값만 바뀝니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues {
    entries: Vec<(String, SqlType, RawValue)>,
}

impl ColumnValues {
    pub fn set(&mut self, column: impl Into<String>, ty: SqlType, value: impl Into<RawValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _, _)| *c == column) {
            Some(entry) => {
                entry.1 = ty;
                entry.2 = value;
            }
            None => self.entries.push((column, ty, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SqlType, &RawValue)> {
        self.entries.iter().map(|(c, t, v)| (c.as_str(), *t, v))
    }
}

/// 조립이 끝난 문장 (태그 variant)
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Select(s) => s.table(),
            Statement::Insert(s) => s.table(),
            Statement::Update(s) => s.table(),
            Statement::Delete(s) => s.table(),
        }
    }

    /// Query 조립
    pub fn assemble(self) -> Result<Query> {
        match self {
            Statement::Select(s) => s.assemble(),
            Statement::Insert(s) => s.assemble(),
            Statement::Update(s) => s.assemble(),
            Statement::Delete(s) => s.assemble(),
        }
    }
}

impl From<Select> for Statement {
    fn from(s: Select) -> Self {
        Statement::Select(s)
    }
}

impl From<Insert> for Statement {
    fn from(s: Insert) -> Self {
        Statement::Insert(s)
    }
}

impl From<Update> for Statement {
    fn from(s: Update) -> Self {
        Statement::Update(s)
    }
}

impl From<Delete> for Statement {
    fn from(s: Delete) -> Self {
        Statement::Delete(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 공통 조립 단계
// ─────────────────────────────────────────────────────────────────────────────

/// 식별자 바인딩 후 토큰 반환
fn bind_identifier(query: &mut Query, ty: SqlType, name: &str) -> Result<String> {
    let position = query.add_binding(ty, name)?;
    Ok(placeholder(position))
}

/// 값 바인딩 후 토큰 반환
fn bind_value(query: &mut Query, ty: SqlType, value: &RawValue) -> Result<String> {
    let position = query.add_binding(ty, value.clone())?;
    Ok(placeholder(position))
}

/// ` WHERE a = x && b > y`
fn push_conditions(query: &mut Query, conditions: &[Condition]) -> Result<()> {
    if conditions.is_empty() {
        return Ok(());
    }

    query.push_sql(" WHERE ");
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            query.push_sql(" && ");
        }
        let column = bind_identifier(query, SqlType::Column, &cond.column)?;
        let value = bind_value(query, cond.ty, &cond.value)?;
        query.push_sql(&format!(
            "{} {} {}",
            column,
            cond.operator.as_sql_for(&cond.value),
            value
        ));
    }
    Ok(())
}

/// ` LIMIT n [OFFSET m]`
///
/// LIMIT은 `limit >= 1`일 때만, OFFSET은 LIMIT이 있고 `offset >= 1`일 때만 붙습니다.
/// LIMIT 없는 OFFSET은 조용히 버려집니다.
fn push_limit(query: &mut Query, limit: u64, offset: u64) -> Result<()> {
    if limit == 0 {
        return Ok(());
    }

    let limit = bind_value(query, SqlType::Big, &RawValue::Int(clamp_to_i64(limit)))?;
    query.push_sql(&format!(" LIMIT {}", limit));

    if offset > 0 {
        let offset = bind_value(query, SqlType::Big, &RawValue::Int(clamp_to_i64(offset)))?;
        query.push_sql(&format!(" OFFSET {}", offset));
    }
    Ok(())
}

fn clamp_to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
