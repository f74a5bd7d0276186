//! CLI 설정

use anyhow::Context as _;

use quill_core::DatabaseConfig;

/// DB 설정 결정
///
/// `--database-url`이 있으면 환경변수의 URL보다 우선합니다.
pub fn database_config(url_override: Option<String>) -> anyhow::Result<DatabaseConfig> {
    match url_override {
        Some(url) => Ok(DatabaseConfig::from_lookup(|key| match key {
            "QUILL_DATABASE_URL" => Some(url.clone()),
            other => std::env::var(other).ok(),
        })?),
        None => DatabaseConfig::from_env().context(
            "Database not configured. Use '--database-url <url>' or set QUILL_DATABASE_URL",
        ),
    }
}

/// `--params` 값 읽기 (`@path`면 파일 내용)
pub fn read_params(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read params file {}", path)),
        None => Ok(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let config = database_config(Some("mysql://override/app".to_string())).unwrap();
        assert_eq!(config.url, "mysql://override/app");
    }

    #[test]
    fn test_inline_params() {
        assert_eq!(read_params(r#"{"table":"t"}"#).unwrap(), r#"{"table":"t"}"#);
        assert!(read_params("@/definitely/not/here.json").is_err());
    }
}
