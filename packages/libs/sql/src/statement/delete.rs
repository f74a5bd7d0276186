//! DELETE 빌더

use quill_core::Result;

use super::{bind_identifier, push_conditions, push_limit, Condition, Operator};
use crate::query::{Query, StatementKind};
use crate::types::{RawValue, SqlType};

/// DELETE 쿼리 빌더
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    conditions: Vec<Condition>,
    limit: u64,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
            limit: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
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
        let mut query = Query::for_kind(StatementKind::Delete);

        let table = bind_identifier(&mut query, SqlType::Table, &self.table)?;
        query.push_sql(&format!("DELETE FROM {}", table));

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
    fn test_delete_scenario() {
        let query = Delete::new("person")
            .filter("id", SqlType::Int, 7, Operator::Eq)
            .limit(1)
            .assemble()
            .unwrap();

        assert_eq!(query.kind(), StatementKind::Delete);
        assert_eq!(query.template(), Some("DELETE FROM %(0) WHERE %(1) = %(2) LIMIT %(3)"));
        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(sql, "DELETE FROM `person` WHERE `id` = 7 LIMIT 1");
    }

    #[test]
    fn test_delete_all_rows() {
        let sql = Delete::new("session")
            .assemble()
            .unwrap()
            .resolve(&RecordingEscaper::default())
            .unwrap();
        assert_eq!(sql, "DELETE FROM `session`");
    }

    #[test]
    fn test_delete_multiple_conditions() {
        let cutoff = chrono::NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let sql = Delete::new("session")
            .filter("expires_at", SqlType::DateTime, cutoff, Operator::Le)
            .where_eq("pinned", SqlType::Tiny, false)
            .assemble()
            .unwrap()
            .resolve(&RecordingEscaper::default())
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM `session` WHERE `expires_at` <= '2023-12-31 23:59:59' && `pinned` = 0"
        );
    }

    #[test]
    fn test_delete_quote_stays_inside_literal() {
        let sql = Delete::new("person")
            .where_eq("name", SqlType::Varchar, "x' OR 1=1 -- ")
            .assemble()
            .unwrap()
            .resolve(&crate::mysql::MySqlEscaper)
            .unwrap();
        // 백슬래시 없이 겹친 따옴표만 사용
        assert_eq!(sql, "DELETE FROM `person` WHERE `name` = 'x'' OR 1=1 -- '");
        assert!(!sql.contains('\\'));
    }
}
