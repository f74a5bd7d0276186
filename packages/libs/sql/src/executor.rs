//! 쿼리 실행기
//!
//! 조립된 [`Query`]를 커넥션 기준으로 해석하고 실행한 뒤,
//! 표 형태 결과는 [`Bucket`]으로, 그 외 결과는 성공 여부로 정규화합니다.

use quill_core::{Bucket, Error, Result};

use crate::connection::{Connection, QueryOutcome, TabularResult};
use crate::query::Query;

/// 실행 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// 조회 결과 (행 인덱스 0부터, fetch 순서)
    Rows(Bucket),

    /// INSERT/UPDATE/DELETE 성공 여부
    Status(bool),
}

impl Execution {
    pub fn is_success(&self) -> bool {
        match self {
            Execution::Rows(_) => true,
            Execution::Status(ok) => *ok,
        }
    }

    pub fn into_rows(self) -> Option<Bucket> {
        match self {
            Execution::Rows(bucket) => Some(bucket),
            Execution::Status(_) => None,
        }
    }
}

/// 쿼리 실행기
///
/// 인스턴스 하나가 커넥션 하나를 소유하며, drop 시점에 커넥션을 해제합니다.
/// 커넥션을 여러 Executor가 공유하거나 동시에 사용하는 것은 지원하지 않습니다.
/// 동시성이 필요하면 Executor를 따로 만드세요.
pub struct Executor<C: Connection> {
    conn: C,
    closed: bool,
    log_statements: bool,
    last_query: Option<String>,
    last_affected_rows: Option<u64>,
}

impl<C: Connection> Executor<C> {
    /// 이미 열린 커넥션으로 실행기 생성
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            closed: false,
            log_statements: true,
            last_query: None,
            last_affected_rows: None,
        }
    }

    /// 실행 SQL을 debug 로그로 남길지 여부
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// 마지막으로 커넥션에 보낸 SQL
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// 마지막 INSERT/UPDATE/DELETE가 영향을 준 행 수
    pub fn last_affected_rows(&self) -> Option<u64> {
        self.last_affected_rows
    }

    /// Query 실행
    ///
    /// 실패한 문장은 부분적으로 채운 Bucket 없이 에러만 돌려줍니다. 재시도하지 않습니다.
    pub fn execute(&mut self, query: &Query) -> Result<Execution> {
        let sql = query.resolve(&self.conn)?;

        if self.log_statements {
            tracing::debug!(sql = %sql, kind = ?query.kind(), "executing query");
        }
        self.last_query = Some(sql.clone());
        self.last_affected_rows = None;

        let outcome = self.conn.run_query(&sql).map_err(|e| {
            tracing::error!(error = %e, "query failed");
            e
        })?;

        match outcome {
            QueryOutcome::Rows(result) => {
                let bucket = rows_to_bucket(result)?;
                tracing::debug!(rows = bucket.len(), "query returned rows");
                Ok(Execution::Rows(bucket))
            }
            QueryOutcome::Affected {
                success,
                rows_affected,
            } => {
                tracing::debug!(success, rows_affected, "query completed");
                self.last_affected_rows = Some(rows_affected);
                Ok(Execution::Status(success))
            }
        }
    }

    /// 커넥션을 명시적으로 해제하고 해제 에러를 돌려받음
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.conn.close()
    }
}

impl<C: Connection> Drop for Executor<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.conn.close() {
            tracing::warn!(error = %e, "failed to close connection");
        }
    }
}

/// 표 형태 결과를 Bucket으로 변환
fn rows_to_bucket(result: TabularResult) -> Result<Bucket> {
    let mut bucket = Bucket::new();
    for (index, row) in result.rows.into_iter().enumerate() {
        if row.len() != result.columns.len() {
            return Err(Error::Connection {
                message: format!(
                    "row {} has {} values for {} columns",
                    index,
                    row.len(),
                    result.columns.len()
                ),
                source: None,
            });
        }
        for (column, value) in result.columns.iter().zip(row) {
            bucket.set(index, column.as_str(), value);
        }
    }
    Ok(bucket)
}
