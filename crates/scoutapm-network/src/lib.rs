//! # scoutapm-network
//!
//! Scout APM REST API 어댑터.
//! `ScoutApi` 포트를 reqwest로 구현하며, 연결 하나를 지연 생성해 재사용하고
//! 응답을 성공 데이터 또는 타입이 있는 에러로 분류한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use scoutapm_core::config::ScoutConfig;
//! use scoutapm_core::models::interval::parse_interval;
//! use scoutapm_core::ports::api_client::ScoutApi;
//! use scoutapm_network::http_client::ScoutHttpClient;
//!
//! let client = ScoutHttpClient::new(&ScoutConfig::new(api_key, "https://scoutapm.com/api"))?;
//! let interval = parse_interval("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z")?;
//! let series = client.scope().get_metric_data(1, "response_time", &interval).await?;
//! ```

pub mod http_client;
