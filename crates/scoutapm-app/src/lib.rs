//! # scoutapm-app
//!
//! Scout APM 도구 레이어. `scoutapm` 바이너리와 통합 테스트가 공유한다.
//!
//! - [`settings`]: 기본값/파일/환경변수/CLI 설정 병합 (config crate)
//! - [`tools`]: 도구 이름 → `ScoutApi` 연산 라우팅, 결과 JSON 정리
//! - [`stdio`]: 줄 단위 JSON 요청/응답 루프

pub mod settings;
pub mod stdio;
pub mod tools;
