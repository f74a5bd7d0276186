//! 결과 행 저장소 (Bucket)
//!
//! Executor가 조회 결과를 돌려줄 때 사용하는 행 인덱스 → 컬럼 이름 → 값 구조입니다.
//! 행 인덱스는 0부터 시작하며 fetch 순서를 그대로 따릅니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 한 행 (컬럼 이름 → 스칼라 값)
pub type BucketRow = Map<String, Value>;

/// 행 인덱스 기반 결과 저장소
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket {
    rows: BTreeMap<usize, BucketRow>,
}

impl Bucket {
    /// 빈 Bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// 값 저장
    ///
    /// 해당 행이 없으면 새로 만들고, 같은 컬럼이 있으면 덮어씁니다.
    pub fn set(&mut self, row: usize, column: impl Into<String>, value: Value) {
        self.rows.entry(row).or_default().insert(column.into(), value);
    }

    /// 값 조회
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(&row).and_then(|r| r.get(column))
    }

    /// 행 조회
    pub fn row(&self, row: usize) -> Option<&BucketRow> {
        self.rows.get(&row)
    }

    /// 행 인덱스 순서로 순회
    pub fn rows(&self) -> impl Iterator<Item = (usize, &BucketRow)> {
        self.rows.iter().map(|(idx, row)| (*idx, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// JSON 객체로 변환 (`{"0": {...}, "1": {...}}`)
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (idx, row) in &self.rows {
            obj.insert(idx.to_string(), Value::Object(row.clone()));
        }
        Value::Object(obj)
    }
}
