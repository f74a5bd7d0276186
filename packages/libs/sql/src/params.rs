//! JSON 문장 파라미터
//!
//! 문장을 JSON으로 기술하고 타입이 지정된 빌더로 변환합니다.
//!
//! # 예시
//!
//! ```json
//! {
//!   "table": "person",
//!   "select": ["id", "name"],
//!   "where": [{ "column": "age", "type": "int", "op": ">=", "value": 18 }],
//!   "order_by": [{ "column": "name" }],
//!   "limit": 10
//! }
//! ```
//!
//! 날짜/시간 타입 값은 여기(입력 경계)에서 타입별 패턴으로 파싱됩니다.
//! 빌더에는 항상 구조화된 날짜 값만 전달됩니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quill_core::{Error, Result};

use crate::query::StatementKind;
use crate::statement::{Condition, Delete, Insert, Operator, Select, Statement, Update};
use crate::types::{RawValue, SqlType};

/// 문장 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementParams {
    /// 대상 테이블
    pub table: String,

    /// SELECT할 컬럼 목록 (기본: "*")
    #[serde(default)]
    pub select: Vec<String>,

    #[serde(default)]
    pub distinct: bool,

    /// WHERE 조건 (AND)
    #[serde(default)]
    pub r#where: Vec<WhereParam>,

    /// 정렬
    #[serde(default)]
    pub order_by: Vec<OrderParam>,

    /// 제한
    #[serde(default)]
    pub limit: Option<u64>,

    /// 오프셋
    #[serde(default)]
    pub offset: Option<u64>,

    /// INSERT/UPDATE 데이터 (지정 순서 유지)
    #[serde(default)]
    pub data: Vec<DataParam>,
}

/// WHERE 조건 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereParam {
    pub column: String,

    #[serde(rename = "type")]
    pub ty: String,

    /// `=`, `!=`, `<`, `<=`, `>`, `>=` 또는 `$eq`, `$gt` 등
    #[serde(default = "default_op")]
    pub op: String,

    #[serde(default)]
    pub value: Value,
}

fn default_op() -> String {
    "=".to_string()
}

/// 정렬 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParam {
    pub column: String,

    #[serde(default)]
    pub order: SortOrder,
}

/// 정렬 순서
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// INSERT/UPDATE 컬럼 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataParam {
    pub column: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub value: Value,
}

impl StatementParams {
    /// JSON 문자열에서 파싱
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 문장 종류에 맞는 빌더로 변환
    pub fn into_statement(self, kind: StatementKind) -> Result<Statement> {
        match kind {
            StatementKind::Select => self.into_select().map(Statement::from),
            StatementKind::Insert => self.into_insert().map(Statement::from),
            StatementKind::Update => self.into_update().map(Statement::from),
            StatementKind::Delete => self.into_delete().map(Statement::from),
            StatementKind::Raw => Err(Error::configuration(
                "raw statements cannot be built from params",
            )),
        }
    }

    pub fn into_select(self) -> Result<Select> {
        let columns = self
            .select
            .iter()
            .map(|c| identifier(SqlType::Column, c))
            .collect::<Result<Vec<_>>>()?;
        let mut select = Select::new(identifier(SqlType::Table, &self.table)?)
            .distinct(self.distinct)
            .columns(columns);
        for cond in conditions(&self.r#where)? {
            select = select.condition(cond);
        }
        for order in &self.order_by {
            let column = identifier(SqlType::Column, &order.column)?;
            select = select.order_by(column, order.order == SortOrder::Desc);
        }
        Ok(select
            .limit(self.limit.unwrap_or(0))
            .offset(self.offset.unwrap_or(0)))
    }

    pub fn into_insert(self) -> Result<Insert> {
        let mut insert = Insert::new(identifier(SqlType::Table, &self.table)?);
        for item in &self.data {
            let (ty, value) = typed(&item.ty, &item.value)?;
            insert = insert.value(identifier(SqlType::Column, &item.column)?, ty, value);
        }
        Ok(insert)
    }

    pub fn into_update(self) -> Result<Update> {
        let mut update = Update::new(identifier(SqlType::Table, &self.table)?);
        for item in &self.data {
            let (ty, value) = typed(&item.ty, &item.value)?;
            update = update.set(identifier(SqlType::Column, &item.column)?, ty, value);
        }
        for cond in conditions(&self.r#where)? {
            update = update.condition(cond);
        }
        Ok(update.limit(self.limit.unwrap_or(0)))
    }

    pub fn into_delete(self) -> Result<Delete> {
        let mut delete = Delete::new(identifier(SqlType::Table, &self.table)?);
        for cond in conditions(&self.r#where)? {
            delete = delete.condition(cond);
        }
        Ok(delete.limit(self.limit.unwrap_or(0)))
    }
}

fn conditions(params: &[WhereParam]) -> Result<Vec<Condition>> {
    params
        .iter()
        .map(|p| {
            let (ty, value) = typed(&p.ty, &p.value)?;
            let operator = Operator::from_symbol(&p.op)?;
            let column = identifier(SqlType::Column, &p.column)?;
            Ok(Condition::new(column, ty, value, operator))
        })
        .collect()
}

/// JSON에서 받은 테이블/컬럼 이름 검사
///
/// 식별자는 escape 없이 백틱으로만 감싸지므로 백틱이나 NUL이 들어간 이름은 거부합니다.
fn identifier(ty: SqlType, name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::type_mismatch(ty.name(), "identifier must not be empty"));
    }
    if name.contains(|c: char| c == '`' || c == '\0') {
        return Err(Error::type_mismatch(
            ty.name(),
            format!("identifier {:?} contains a backtick or NUL", name),
        ));
    }
    Ok(name.to_string())
}

fn typed(type_name: &str, value: &Value) -> Result<(SqlType, RawValue)> {
    let ty = SqlType::from_name(type_name)?;
    Ok((ty, json_to_raw(ty, value)?))
}

/// JSON 값을 원시 값으로 변환
///
/// 캐스팅은 바인딩 시점에 타입 규칙으로 처리되므로, 여기서는 형태만 옮깁니다.
/// 날짜/시간 타입만 예외로 문자열(또는 timestamp 정수)을 파싱합니다.
pub fn json_to_raw(ty: SqlType, value: &Value) -> Result<RawValue> {
    if ty.is_temporal() && !value.is_null() {
        return parse_temporal(ty, value).map(RawValue::DateTime);
    }

    match value {
        Value::Null => Ok(RawValue::Null),
        Value::Bool(b) => Ok(RawValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(RawValue::Int(i))
            } else if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
                Ok(RawValue::Float(f))
            } else {
                // i64 범위를 넘는 u64
                Ok(RawValue::Text(n.to_string()))
            }
        }
        Value::String(s) => Ok(RawValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(Error::type_mismatch(
            ty.name(),
            "nested JSON values cannot be bound",
        )),
    }
}

fn parse_temporal(ty: SqlType, value: &Value) -> Result<NaiveDateTime> {
    let mismatch = || Error::type_mismatch(ty.name(), format!("cannot parse {} as {}", value, ty));

    if let Some(n) = value.as_i64() {
        return match ty {
            SqlType::Timestamp => DateTime::from_timestamp(n, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(mismatch),
            SqlType::Year => i32::try_from(n)
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
                .map(|d| d.and_time(NaiveTime::MIN))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        };
    }

    let text = value.as_str().ok_or_else(mismatch)?.trim();
    let parsed = match ty {
        SqlType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN)),
        SqlType::Time => NaiveTime::parse_from_str(text, "%H:%M:%S")
            .ok()
            .and_then(|t| NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(t))),
        SqlType::Year => text
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            .map(|d| d.and_time(NaiveTime::MIN)),
        _ => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc())),
    };
    parsed.ok_or_else(mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mysql::MySqlEscaper;

    fn resolve(statement: Statement) -> String {
        statement.assemble().unwrap().resolve(&MySqlEscaper).unwrap()
    }

    #[test]
    fn test_params_deserialization() {
        let json = r#"{
            "table": "person",
            "select": ["id", "name"],
            "where": [{ "column": "age", "type": "int", "op": ">=", "value": 18 }],
            "order_by": [{ "column": "name" }],
            "limit": 10
        }"#;

        let params = StatementParams::from_json(json).unwrap();
        assert_eq!(params.table, "person");
        assert_eq!(params.r#where[0].op, ">=");
        assert_eq!(params.order_by[0].order, SortOrder::Asc);
        assert_eq!(params.limit, Some(10));

        let sql = resolve(params.into_statement(StatementKind::Select).unwrap());
        assert_eq!(
            sql,
            "SELECT `id`, `name` FROM `person` WHERE `age` >= 18 ORDER BY `name` LIMIT 10"
        );
    }

    #[test]
    fn test_insert_keeps_data_order() {
        let json = r#"{
            "table": "person",
            "data": [
                { "column": "name", "type": "varchar", "value": "Ann" },
                { "column": "age", "type": "int", "value": 30 },
                { "column": "born", "type": "date", "value": "1994-02-01" }
            ]
        }"#;

        let params = StatementParams::from_json(json).unwrap();
        let sql = resolve(params.into_statement(StatementKind::Insert).unwrap());
        assert_eq!(
            sql,
            "INSERT INTO `person` (`name`, `age`, `born`) VALUES ('Ann', 30, '1994-02-01')"
        );
    }

    #[test]
    fn test_update_and_delete() {
        let json = r#"{
            "table": "person",
            "data": [{ "column": "name", "type": "text", "value": null }],
            "where": [{ "column": "id", "type": "big", "value": 7 }],
            "limit": 1
        }"#;

        let update = StatementParams::from_json(json).unwrap().into_update().unwrap();
        assert_eq!(
            resolve(update.into()),
            "UPDATE `person` SET `name`=NULL WHERE `id` = 7 LIMIT 1"
        );

        let delete = StatementParams::from_json(json).unwrap().into_delete().unwrap();
        assert_eq!(
            resolve(delete.into()),
            "DELETE FROM `person` WHERE `id` = 7 LIMIT 1"
        );
    }

    #[test]
    fn test_descending_order_and_offset() {
        let json = r#"{
            "table": "event",
            "order_by": [{ "column": "starts_at", "order": "desc" }],
            "offset": 5
        }"#;
        let select = StatementParams::from_json(json).unwrap().into_select().unwrap();
        assert_eq!(
            resolve(select.into()),
            "SELECT * FROM `event` ORDER BY `starts_at` DESC"
        );
    }

    #[test]
    fn test_unknown_type_and_operator() {
        let json = r#"{ "table": "t", "where": [{ "column": "a", "type": "blob", "value": 1 }] }"#;
        let err = StatementParams::from_json(json).unwrap().into_select().unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_TYPE");

        let json = r#"{
            "table": "t",
            "where": [{ "column": "a", "type": "int", "op": "LIKE", "value": 1 }]
        }"#;
        let err = StatementParams::from_json(json).unwrap().into_delete().unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_OPERATOR");
    }

    #[test]
    fn test_identifiers_with_backticks_rejected() {
        let json = r#"{
            "table": "person",
            "select": ["id` FROM `person`; DROP TABLE `users`; -- "]
        }"#;
        let err = StatementParams::from_json(json).unwrap().into_select().unwrap_err();
        assert_eq!(err.code(), "TYPE_MISMATCH");

        let json = r#"{ "table": "person`; DROP TABLE `users" }"#;
        let err = StatementParams::from_json(json).unwrap().into_delete().unwrap_err();
        assert_eq!(err.code(), "TYPE_MISMATCH");

        let json = r#"{
            "table": "person",
            "where": [{ "column": "a`b", "type": "int", "value": 1 }]
        }"#;
        assert!(StatementParams::from_json(json).unwrap().into_delete().is_err());

        let json = r#"{
            "table": "person",
            "order_by": [{ "column": "name\u0000" }]
        }"#;
        assert!(StatementParams::from_json(json).unwrap().into_select().is_err());

        let json = r#"{
            "table": "person",
            "data": [{ "column": "", "type": "int", "value": 1 }]
        }"#;
        assert!(StatementParams::from_json(json).unwrap().into_insert().is_err());
        assert!(StatementParams::from_json(json).unwrap().into_update().is_err());
    }

    #[test]
    fn test_raw_kind_rejected() {
        let params = StatementParams {
            table: "t".to_string(),
            ..Default::default()
        };
        let err = params.into_statement(StatementKind::Raw).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_invalid_json() {
        let err = StatementParams::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), "JSON_ERROR");
    }

    #[test]
    fn test_json_to_raw_shapes() {
        assert_eq!(json_to_raw(SqlType::Int, &Value::Null).unwrap(), RawValue::Null);
        assert_eq!(json_to_raw(SqlType::Int, &serde_json::json!(5)).unwrap(), RawValue::Int(5));
        assert_eq!(
            json_to_raw(SqlType::Double, &serde_json::json!(1.5)).unwrap(),
            RawValue::Float(1.5)
        );
        assert_eq!(
            json_to_raw(SqlType::Varchar, &serde_json::json!("x")).unwrap(),
            RawValue::Text("x".into())
        );
        assert!(json_to_raw(SqlType::Text, &serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_temporal_parsing() {
        let dt = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();

        assert_eq!(
            json_to_raw(SqlType::DateTime, &serde_json::json!("2024-03-09 14:05:30")).unwrap(),
            RawValue::DateTime(dt("2024-03-09 14:05:30"))
        );
        assert_eq!(
            json_to_raw(SqlType::Timestamp, &serde_json::json!(1709993130)).unwrap(),
            RawValue::DateTime(dt("2024-03-09 14:05:30"))
        );
        assert_eq!(
            json_to_raw(SqlType::Timestamp, &serde_json::json!("2024-03-09T14:05:30Z")).unwrap(),
            RawValue::DateTime(dt("2024-03-09 14:05:30"))
        );
        assert_eq!(
            json_to_raw(SqlType::Time, &serde_json::json!("08:30:00")).unwrap(),
            RawValue::DateTime(dt("1970-01-01 08:30:00"))
        );
        assert_eq!(
            json_to_raw(SqlType::Year, &serde_json::json!("1999")).unwrap(),
            RawValue::DateTime(dt("1999-01-01 00:00:00"))
        );
        assert_eq!(
            json_to_raw(SqlType::Year, &serde_json::json!(1999)).unwrap(),
            RawValue::DateTime(dt("1999-01-01 00:00:00"))
        );
        assert!(json_to_raw(SqlType::Year, &serde_json::json!(i64::MAX)).is_err());

        let err = json_to_raw(SqlType::Date, &serde_json::json!("09/03/2024")).unwrap_err();
        assert_eq!(err.code(), "TYPE_MISMATCH");
        assert!(json_to_raw(SqlType::Date, &serde_json::json!(1709993130)).is_err());
    }
}
