//! quill-core: Quill 공통 핵심 라이브러리
//!
//! SQL 빌더(`quill-sql`)와 CLI가 공유하는 타입을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `error`: 공통 에러 타입
//! - `bucket`: 조회 결과 행 저장소
//! - `config`: 데이터베이스 접속 설정

pub mod bucket;
pub mod config;
pub mod error;

pub use bucket::{Bucket, BucketRow};
pub use config::DatabaseConfig;
pub use error::{Error, Result};
