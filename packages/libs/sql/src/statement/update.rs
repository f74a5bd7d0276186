//! UPDATE 빌더

use quill_core::{Error, Result};

use super::{
    bind_identifier, bind_value, push_conditions, push_limit, ColumnValues, Condition, Operator,
};
use crate::query::{Query, StatementKind};
use crate::types::{RawValue, SqlType};

/// UPDATE 쿼리 빌더
///
/// 변경할 컬럼이 하나도 없으면 조립이 실패합니다 (no-op 아님).
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    assignments: ColumnValues,
    conditions: Vec<Condition>,
    limit: u64,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: ColumnValues::default(),
            conditions: Vec::new(),
            limit: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// SET 항목 추가
    pub fn set(
        mut self,
        column: impl Into<String>,
        ty: SqlType,
        value: impl Into<RawValue>,
    ) -> Self {
        self.assignments.set(column, ty, value);
        self
    }

    pub fn filter(
        mut self,
        column: impl Into<String>,
        ty: SqlType,
        value: impl Into<RawValue>,
        operator: Operator,
    ) -> Self {
        self.conditions.push(Condition::new(column, ty, value, operator));
        self
    }

    pub fn where_eq(
        self,
        column: impl Into<String>,
        ty: SqlType,
        value: impl Into<RawValue>,
    ) -> Self {
        self.filter(column, ty, value, Operator::Eq)
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Query 조립
    pub fn assemble(self) -> Result<Query> {
        if self.assignments.is_empty() {
            return Err(Error::EmptyAssignment { table: self.table });
        }

        let mut query = Query::for_kind(StatementKind::Update);

        let table = bind_identifier(&mut query, SqlType::Table, &self.table)?;

        // SET 절
        let mut items = Vec::with_capacity(self.assignments.len());
        for (column, ty, value) in self.assignments.iter() {
            let column = bind_identifier(&mut query, SqlType::Column, column)?;
            let value = bind_value(&mut query, ty, value)?;
            items.push(format!("{}={}", column, value));
        }
        query.push_sql(&format!("UPDATE {} SET {}", table, items.join(", ")));

        // WHERE 절
        push_conditions(&mut query, &self.conditions)?;

        push_limit(&mut query, self.limit, 0)?;

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::RecordingEscaper;

    #[test]
    fn test_update_basic() {
        let query = Update::new("person")
            .set("name", SqlType::Varchar, "Ann")
            .set("age", SqlType::Int, 31)
            .where_eq("id", SqlType::Int, 7)
            .limit(1)
            .assemble()
            .unwrap();

        assert_eq!(query.kind(), StatementKind::Update);
        assert_eq!(
            query.template(),
            Some("UPDATE %(0) SET %(1)=%(2), %(3)=%(4) WHERE %(5) = %(6) LIMIT %(7)")
        );
        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(
            sql,
            "UPDATE `person` SET `name`='Ann', `age`=31 WHERE `id` = 7 LIMIT 1"
        );
    }

    #[test]
    fn test_update_without_conditions() {
        let sql = Update::new("counter")
            .set("hits", SqlType::Big, 0)
            .assemble()
            .unwrap()
            .resolve(&RecordingEscaper::default())
            .unwrap();
        assert_eq!(sql, "UPDATE `counter` SET `hits`=0");
    }

    #[test]
    fn test_update_set_null() {
        let sql = Update::new("person")
            .set("deleted_at", SqlType::DateTime, None::<chrono::NaiveDateTime>)
            .filter("id", SqlType::Int, 3, Operator::Gt)
            .assemble()
            .unwrap()
            .resolve(&RecordingEscaper::default())
            .unwrap();
        assert_eq!(sql, "UPDATE `person` SET `deleted_at`=NULL WHERE `id` > 3");
    }

    #[test]
    fn test_empty_assignment_rejected() {
        for table in ["person", ""] {
            let err = Update::new(table).assemble().unwrap_err();
            assert_eq!(err.code(), "EMPTY_ASSIGNMENT");
            assert!(err.is_fatal());
        }

        let err = Update::new("person")
            .where_eq("id", SqlType::Int, 1)
            .limit(1)
            .assemble()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyAssignment { ref table } if table == "person"));
    }
}
