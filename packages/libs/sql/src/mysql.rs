//! MySQL 커넥션 (sqlx)
//!
//! 공개 API는 동기/블로킹입니다. 커넥션마다 current-thread tokio 런타임을 하나 소유하고,
//! 모든 호출을 그 런타임에서 `block_on`으로 끝까지 실행합니다.
//! 이미 tokio 런타임 안에서 돌고 있는 스레드에서 호출하면 안 됩니다.

use std::time::Duration;

use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection as _, Row, TypeInfo};
use tokio::runtime::{Builder, Runtime};

use quill_core::{DatabaseConfig, Error, Result};

use crate::connection::{Connection, Escape, QueryOutcome, TabularResult};
use crate::executor::Executor;

/// MySQL 문자열 리터럴 escape
///
/// `real_escape_string` 규칙을 따르되 작은따옴표는 `''`로 겹쳐 씁니다.
/// `''`는 `NO_BACKSLASH_ESCAPES` 모드에서도 같은 의미이므로,
/// 어느 모드에서든 값이 리터럴 밖으로 나가지 않습니다.
pub fn escape_mysql_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out
}

/// 커넥션 없이 쓰는 MySQL escaper (렌더링 미리보기용)
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlEscaper;

impl Escape for MySqlEscaper {
    fn escape_string(&self, s: &str) -> String {
        escape_mysql_string(s)
    }
}

/// 표 형태 결과를 돌려주는 문장인지 (첫 키워드 기준)
fn returns_rows(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .trim_start_matches('(')
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        keyword.as_str(),
        "select" | "show" | "describe" | "desc" | "explain" | "with"
    )
}

/// MySQL 커넥션
pub struct MySqlConnection {
    runtime: Runtime,
    conn: Option<sqlx::MySqlConnection>,
}

impl MySqlConnection {
    /// 커넥션 열기
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::connection("failed to start runtime", e))?;

        let options: MySqlConnectOptions = config
            .url
            .parse()
            .map_err(|e| Error::connection("invalid database url", e))?;

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let conn = runtime
            .block_on(async { tokio::time::timeout(timeout, options.connect()).await })
            .map_err(|e| {
                Error::connection(
                    format!("connect timed out after {}s", config.connect_timeout_secs),
                    e,
                )
            })?
            .map_err(|e| Error::connection("cannot connect", e))?;

        tracing::info!("database connection opened");

        Ok(Self {
            runtime,
            conn: Some(conn),
        })
    }
}

impl Escape for MySqlConnection {
    fn escape_string(&self, s: &str) -> String {
        escape_mysql_string(s)
    }
}

impl Connection for MySqlConnection {
    fn run_query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let conn = self.conn.as_mut().ok_or_else(|| Error::Connection {
            message: "connection is closed".to_string(),
            source: None,
        })?;

        if returns_rows(sql) {
            let rows = self
                .runtime
                .block_on(sqlx::raw_sql(sql).fetch_all(&mut *conn))
                .map_err(|e| Error::connection("query rejected", e))?;
            Ok(QueryOutcome::Rows(rows_to_table(&rows)))
        } else {
            let result = self
                .runtime
                .block_on(sqlx::raw_sql(sql).execute(&mut *conn))
                .map_err(|e| Error::connection("query rejected", e))?;
            Ok(QueryOutcome::Affected {
                success: true,
                rows_affected: result.rows_affected(),
            })
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            self.runtime
                .block_on(conn.close())
                .map_err(|e| Error::connection("failed to close connection", e))?;
            tracing::debug!("database connection closed");
        }
        Ok(())
    }
}

impl Executor<MySqlConnection> {
    /// 설정으로 커넥션을 열고 실행기 생성
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let conn = MySqlConnection::open(config)?;
        Ok(Executor::new(conn).log_statements(config.log_statements))
    }
}

fn rows_to_table(rows: &[MySqlRow]) -> TabularResult {
    let Some(first) = rows.first() else {
        return TabularResult::default();
    };

    let columns: Vec<(String, String)> = first
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), c.type_info().name().to_ascii_uppercase()))
        .collect();

    let mut table = TabularResult::new(columns.iter().map(|(name, _)| name.clone()).collect());
    for row in rows {
        let values = columns
            .iter()
            .enumerate()
            .map(|(index, (_, type_name))| column_value(row, index, type_name))
            .collect();
        table.push_row(values);
    }
    table
}

/// 행에서 index번째 컬럼 값을 꺼냄
fn column_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let text = match row.try_get_unchecked::<Option<String>, _>(index) {
        Ok(Some(text)) => text,
        Ok(None) => return Value::Null,
        Err(_) => {
            // 바이너리 컬럼
            return row
                .try_get_unchecked::<Option<Vec<u8>>, _>(index)
                .ok()
                .flatten()
                .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
                .unwrap_or(Value::Null);
        }
    };
    text_to_json(type_name, text)
}

/// 텍스트 프로토콜 값을 컬럼 타입에 맞는 JSON 스칼라로 변환
fn text_to_json(type_name: &str, text: String) -> Value {
    let base = type_name.trim_end_matches(" UNSIGNED");
    match base {
        "BOOLEAN" => Value::Bool(text != "0"),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => text
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| text.parse::<u64>().map(Value::from))
            .unwrap_or(Value::String(text)),
        "FLOAT" | "DOUBLE" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        "JSON" => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        // DECIMAL은 정밀도 보존을 위해 문자열, 날짜는 서버 포맷 그대로
        _ => Value::String(text),
    }
}
