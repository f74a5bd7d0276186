//! 커넥션 인터페이스
//!
//! Query 해석과 Executor가 의존하는 외부 협력자(라이브 DB 커넥션)의 경계입니다.
//! 커넥션을 어떻게 얻고 재사용할지는 이 레이어가 결정하지 않습니다.

use serde_json::Value;

use quill_core::Result;

/// 문자열 리터럴 escape 기능
///
/// Query 해석은 이 trait만 필요로 하므로, 라이브 DB 없이도 테스트할 수 있습니다.
pub trait Escape {
    /// 따옴표로 감싸기 전의 문자열 내용을 escape
    fn escape_string(&self, s: &str) -> String;
}

/// 라이브 DB 커넥션
///
/// 하나의 커넥션을 여러 호출자가 동시에 사용하는 것은 지원하지 않습니다.
pub trait Connection: Escape {
    /// 해석이 끝난 SQL 실행
    fn run_query(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// 커넥션 해제
    fn close(&mut self) -> Result<()>;
}

/// 커넥션 실행 결과
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// 표 형태 결과 (SELECT 등)
    Rows(TabularResult),

    /// 영향받은 행 수 형태 결과 (INSERT/UPDATE/DELETE)
    Affected { success: bool, rows_affected: u64 },
}

/// 표 형태 결과 (fetch 순서 유지)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// 행 추가 (컬럼 순서대로)
    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }
}
