//! quill-sql: 타입 기반 SQL 조립 및 값 바인딩 라이브러리
//!
//! 선언적으로 쌓은 CRUD 문장을 `%(i)` 토큰 템플릿 + 타입 지정 바인딩으로 조립하고,
//! 커넥션의 escape 기능으로 리터럴을 치환해 실행 가능한 SQL을 만듭니다.
//! 문자열 값은 반드시 escape를 거치고, 식별자는 backtick으로 감싸기만 합니다.
//!
//! # 모듈 구조
//!
//! - `types`: 값 타입 카탈로그 (캐스팅/리터럴 렌더링)
//! - `query`: placeholder 엔진
//! - `statement`: SELECT/INSERT/UPDATE/DELETE 빌더
//! - `params`: JSON 문장 파라미터
//! - `connection`: 커넥션 인터페이스
//! - `executor`: 실행 및 결과 → Bucket 변환
//! - `mysql`: sqlx 기반 MySQL 커넥션

pub mod connection;
pub mod executor;
pub mod mysql;
pub mod params;
pub mod query;
pub mod statement;
pub mod types;

pub use connection::{Connection, Escape, QueryOutcome, TabularResult};
pub use executor::{Execution, Executor};
pub use mysql::{MySqlConnection, MySqlEscaper};
pub use params::StatementParams;
pub use query::{placeholder, Query, StatementKind};
pub use statement::{Condition, Delete, Insert, Operator, OrderClause, Select, Statement, Update};
pub use types::{RawValue, SqlType, TypedValue};
