//! INSERT 빌더

use quill_core::Result;

use super::{bind_identifier, bind_value, ColumnValues};
use crate::query::{Query, StatementKind};
use crate::types::{RawValue, SqlType};

/// INSERT 쿼리 빌더
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: String,
    values: ColumnValues,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: ColumnValues::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// 컬럼 값 지정 (지정 순서대로 출력)
    pub fn value(
        mut self,
        column: impl Into<String>,
        ty: SqlType,
        value: impl Into<RawValue>,
    ) -> Self {
        self.values.set(column, ty, value);
        self
    }

    /// Query 조립
    ///
    /// 바인딩은 테이블, 그리고 항목마다 컬럼 → 값 순서로 번갈아 추가됩니다.
    /// 값이 하나도 없으면 `() VALUES ()`가 되어 모든 컬럼이 기본값을 씁니다.
    pub fn assemble(self) -> Result<Query> {
        let mut query = Query::for_kind(StatementKind::Insert);

        let table = bind_identifier(&mut query, SqlType::Table, &self.table)?;

        let mut columns = Vec::with_capacity(self.values.len());
        let mut values = Vec::with_capacity(self.values.len());
        for (column, ty, value) in self.values.iter() {
            columns.push(bind_identifier(&mut query, SqlType::Column, column)?);
            values.push(bind_value(&mut query, ty, value)?);
        }

        query.push_sql(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        ));

        Ok(query)
    }
}
