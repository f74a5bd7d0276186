//! Query (placeholder 엔진)
//!
//! SQL 템플릿과 순서가 있는 바인딩 목록을 묶습니다.
//! 템플릿의 `%(i)` 토큰은 해석(resolve) 시점에 i번째 바인딩의 리터럴로 치환됩니다.
//!
//! ```text
//! template: SELECT %(0) FROM %(1) WHERE %(2) >= %(3)
//! bindings: [column id, table person, column age, int 18]
//! resolved: SELECT `id` FROM `person` WHERE `age` >= 18
//! ```

use quill_core::{Error, Result};

use crate::connection::Escape;
use crate::types::{RawValue, SqlType, TypedValue};

/// 문장 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// 빌더를 거치지 않고 템플릿을 직접 지정한 경우
    #[default]
    Raw,
}

/// `%(i)` 토큰 생성
pub fn placeholder(position: usize) -> String {
    format!("%({})", position)
}

/// SQL 템플릿 + 바인딩
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    template: Option<String>,
    bindings: Vec<TypedValue>,
    kind: StatementKind,
}

impl Query {
    /// 빈 Query (템플릿 없음)
    pub fn new() -> Self {
        Self::default()
    }

    /// 템플릿을 지정한 Query
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub(crate) fn for_kind(kind: StatementKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// 바인딩 추가
    ///
    /// 새로 부여된 위치를 반환합니다. 위치는 0부터 호출 순서대로 연속됩니다.
    pub fn add_binding(&mut self, ty: SqlType, value: impl Into<RawValue>) -> Result<usize> {
        let value = TypedValue::new(ty, value)?;
        Ok(self.push_binding(value))
    }

    /// 이미 검증된 값 바인딩
    pub fn push_binding(&mut self, value: TypedValue) -> usize {
        self.bindings.push(value);
        self.bindings.len() - 1
    }

    /// 템플릿 설정 (기존 템플릿을 덮어씀)
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    /// 템플릿 뒤에 SQL 조각 추가
    pub fn push_sql(&mut self, sql: &str) {
        self.template.get_or_insert_with(String::new).push_str(sql);
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn bindings(&self) -> &[TypedValue] {
        &self.bindings
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 최종 SQL로 해석
    ///
    /// 템플릿을 왼쪽부터 한 번만 훑으며 토큰을 치환합니다.
    /// 치환된 리터럴은 다시 검사하지 않으므로, 값 안의 `%(0)` 같은 문자열은 그대로 남습니다.
    /// Query 자체는 변경되지 않습니다.
    pub fn resolve(&self, escaper: &dyn Escape) -> Result<String> {
        let template = self.template.as_deref().ok_or_else(|| Error::MalformedTemplate {
            message: "template is not set".to_string(),
        })?;

        let rendered: Vec<String> = self.bindings.iter().map(|b| b.render(escaper)).collect();

        let literal_len: usize = rendered.iter().map(String::len).sum();
        let mut out = String::with_capacity(template.len() + literal_len);
        let mut rest = template;
        while let Some(start) = rest.find("%(") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();

            if digits == 0 || !after[digits..].starts_with(')') {
                // 토큰 형식이 아니면 그대로 복사
                out.push_str("%(");
                rest = after;
                continue;
            }

            let literal = after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|index| rendered.get(index))
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "template references %({}) but only {} bindings exist",
                        &after[..digits],
                        rendered.len()
                    ))
                })?;
            out.push_str(literal);
            rest = &after[digits + 1..];
        }
        out.push_str(rest);

        tracing::trace!(bindings = rendered.len(), "query resolved");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::RecordingEscaper;

    #[test]
    fn test_positions_are_contiguous() {
        let mut query = Query::new();
        let positions: Vec<usize> = (0..5)
            .map(|i| query.add_binding(SqlType::Int, i).unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
        assert_eq!(query.len(), 5);
    }

    #[test]
    fn test_failed_binding_does_not_consume_position() {
        let mut query = Query::new();
        assert_eq!(query.add_binding(SqlType::Int, 1).unwrap(), 0);
        assert!(query.add_binding(SqlType::Table, RawValue::Null).is_err());
        assert_eq!(query.add_binding(SqlType::Int, 2).unwrap(), 1);
    }

    #[test]
    fn test_resolve_replaces_every_occurrence() {
        let mut query = Query::new();
        let col = query.add_binding(SqlType::Column, "name").unwrap();
        let val = query.add_binding(SqlType::Varchar, "Ann").unwrap();
        query.set_template(format!(
            "{c} = {v} OR {c} = {v}",
            c = placeholder(col),
            v = placeholder(val)
        ));

        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(sql, "`name` = 'Ann' OR `name` = 'Ann'");
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let mut query = Query::new();
        let p = query.add_binding(SqlType::Varchar, "x").unwrap();
        query.push_sql("SELECT ");
        query.push_sql(&placeholder(p));

        let escaper = RecordingEscaper::default();
        let first = query.resolve(&escaper).unwrap();
        let second = query.resolve(&escaper).unwrap();
        assert_eq!(first, "SELECT 'x'");
        assert_eq!(first, second);
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_double_digit_positions() {
        let mut query = Query::new();
        let mut parts = Vec::new();
        for i in 0..12 {
            let p = query.add_binding(SqlType::Int, i * 10).unwrap();
            parts.push(placeholder(p));
        }
        query.set_template(parts.join(","));

        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(sql, "0,10,20,30,40,50,60,70,80,90,100,110");
    }

    #[test]
    fn test_literals_are_not_rescanned() {
        let mut query = Query::new();
        let a = query.add_binding(SqlType::Varchar, "%(1)").unwrap();
        let b = query.add_binding(SqlType::Int, 5).unwrap();
        query.set_template(format!("{} {}", placeholder(a), placeholder(b)));

        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(sql, "'%(1)' 5");
    }

    #[test]
    fn test_non_token_sequences_are_kept() {
        let mut query = Query::with_template("SELECT '%(' , %(x) , %(0)");
        query.add_binding(SqlType::Int, 1).unwrap();

        let sql = query.resolve(&RecordingEscaper::default()).unwrap();
        assert_eq!(sql, "SELECT '%(' , %(x) , 1");
    }

    #[test]
    fn test_unresolved_token_fails() {
        let mut query = Query::with_template("SELECT %(0), %(1)");
        query.add_binding(SqlType::Int, 1).unwrap();

        let err = query.resolve(&RecordingEscaper::default()).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("%(1)"));
    }

    #[test]
    fn test_missing_template_fails() {
        let mut query = Query::new();
        query.add_binding(SqlType::Int, 1).unwrap();

        let err = query.resolve(&RecordingEscaper::default()).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_TEMPLATE");
    }

    #[test]
    fn test_null_binding_resolves_to_null() {
        let mut query = Query::with_template("%(0) %(1) %(2)");
        query.add_binding(SqlType::Varchar, RawValue::Null).unwrap();
        query.add_binding(SqlType::Big, RawValue::Null).unwrap();
        query.add_binding(SqlType::Date, RawValue::Null).unwrap();

        let escaper = RecordingEscaper::default();
        assert_eq!(query.resolve(&escaper).unwrap(), "NULL NULL NULL");
        assert_eq!(escaper.calls(), 0);
    }

    #[test]
    fn test_escaping_applies_only_to_strings() {
        let mut query = Query::with_template("%(0) %(1) %(2)");
        query.add_binding(SqlType::Table, "person").unwrap();
        query.add_binding(SqlType::Column, "name").unwrap();
        query.add_binding(SqlType::Varchar, "it's").unwrap();

        let escaper = RecordingEscaper::default();
        let sql = query.resolve(&escaper).unwrap();
        assert_eq!(sql, "`person` `name` 'it''s'");
        assert_eq!(escaper.calls(), 1);
    }
}
