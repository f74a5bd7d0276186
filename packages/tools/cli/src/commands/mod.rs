//! CLI 명령어 구현

pub mod statement;
