//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `scoutapm-network`가 구현하고, `scoutapm-app`의 도구 라우터가
//! `Arc<dyn ScoutApi>`로 와이어링한다.

pub mod api_client;
