//! SELECT 빌더

use quill_core::Result;

use super::{bind_identifier, push_conditions, push_limit, Condition, Operator, OrderClause};
use crate::query::{Query, StatementKind};
use crate::types::{RawValue, SqlType};

/// SELECT 쿼리 빌더
///
/// ```text
/// SELECT [DISTINCT] <컬럼 목록 | *> FROM <테이블>
///     [WHERE <조건>] [ORDER BY <정렬>] [LIMIT n [OFFSET m]]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    distinct: bool,
    expressions: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Vec<OrderClause>,
    limit: u64,
    offset: u64,
}

impl Select {
    /// 새 빌더 생성
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            distinct: false,
            expressions: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: 0,
            offset: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// 조회할 컬럼 추가 (비어 있으면 `*`)
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.expressions.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expressions.extend(columns.into_iter().map(Into::into));
        self
    }

    /// WHERE 조건 추가
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

    /// 단순 equality 조건 추가
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

    /// 정렬 추가
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by.push(OrderClause {
            column: column.into(),
            descending,
        });
        self
    }

    /// 제한 (0 = 없음)
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// 오프셋 (LIMIT이 없으면 무시됨)
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Query 조립
    pub fn assemble(self) -> Result<Query> {
        let mut query = Query::for_kind(StatementKind::Select);

        // SELECT columns
        query.push_sql("SELECT ");
        if self.distinct {
            query.push_sql("DISTINCT ");
        }
        if self.expressions.is_empty() {
            query.push_sql("*");
        } else {
            let mut columns = Vec::with_capacity(self.expressions.len());
            for expr in &self.expressions {
                columns.push(bind_identifier(&mut query, SqlType::Column, expr)?);
            }
            query.push_sql(&columns.join(", "));
        }

        // FROM
        let table = bind_identifier(&mut query, SqlType::Table, &self.table)?;
        query.push_sql(&format!(" FROM {}", table));

        // WHERE
        push_conditions(&mut query, &self.conditions)?;

        // ORDER BY
        if !self.order_by.is_empty() {
            let mut items = Vec::with_capacity(self.order_by.len());
            for order in &self.order_by {
                let column = bind_identifier(&mut query, SqlType::Column, &order.column)?;
                if order.descending {
                    items.push(format!("{} DESC", column));
                } else {
                    items.push(column);
                }
            }
            query.push_sql(&format!(" ORDER BY {}", items.join(", ")));
        }

        // LIMIT / OFFSET
        push_limit(&mut query, self.limit, self.offset)?;

        Ok(query)
    }
}
