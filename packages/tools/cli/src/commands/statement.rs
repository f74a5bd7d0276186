//! 문장 렌더링/실행 명령어

use quill_core::{Bucket, BucketRow, DatabaseConfig};
use quill_sql::{Execution, Executor, MySqlEscaper, Query, StatementKind, StatementParams};

use crate::config::read_params;
use crate::OutputFormat;

fn build_query(kind: StatementKind, raw_params: &str) -> anyhow::Result<Query> {
    let json = read_params(raw_params)?;
    let query = StatementParams::from_json(&json)?
        .into_statement(kind)?
        .assemble()?;
    Ok(query)
}

/// DB 없이 최종 SQL 출력
pub fn render(
    kind: StatementKind,
    raw_params: &str,
    explain: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let query = build_query(kind, raw_params)?;
    let sql = query.resolve(&MySqlEscaper)?;

    match format {
        OutputFormat::Text => {
            println!("{}", sql);
            if explain {
                println!("-- template: {}", query.template().unwrap_or_default());
                for (i, binding) in query.bindings().iter().enumerate() {
                    println!("-- %({}) {} {}", i, binding.ty(), binding.render(&MySqlEscaper));
                }
            }
        }
        OutputFormat::Json => {
            let bindings: Vec<serde_json::Value> = query
                .bindings()
                .iter()
                .map(|b| {
                    serde_json::json!({
                        "type": b.ty().name(),
                        "literal": b.render(&MySqlEscaper),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "sql": sql,
                "template": query.template(),
                "bindings": bindings,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

/// 문장을 실행하고 결과 출력
pub fn exec(
    db: &DatabaseConfig,
    kind: StatementKind,
    raw_params: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let query = build_query(kind, raw_params)?;
    tracing::info!(kind = ?kind, "executing statement");

    let mut executor = Executor::connect(db)?;
    let execution = executor.execute(&query)?;
    let affected = executor.last_affected_rows();
    executor.close()?;

    match (execution, format) {
        (Execution::Rows(bucket), OutputFormat::Text) => print_rows(&bucket),
        (Execution::Rows(bucket), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&bucket.to_json())?);
        }
        (Execution::Status(ok), OutputFormat::Text) => {
            let status = if ok { "ok" } else { "failed" };
            println!("{} ({} rows affected)", status, affected.unwrap_or(0));
        }
        (Execution::Status(ok), OutputFormat::Json) => {
            let out = serde_json::json!({ "success": ok, "affected": affected });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

fn print_rows(bucket: &Bucket) {
    if bucket.is_empty() {
        println!("(no rows)");
        return;
    }
    for (index, row) in bucket.rows() {
        println!("{}", row_line(index, row));
    }
    println!("({} rows)", bucket.len());
}

fn row_line(index: usize, row: &BucketRow) -> String {
    let fields: Vec<String> = row.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("#{} {}", index, fields.join(" "))
}
