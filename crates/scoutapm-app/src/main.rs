//! # scoutapm
//!
//! Scout APM 도구 CLI 진입점.
//! 설정 로드, 클라이언트 DI, 단일 도구 호출 또는 stdio 서빙.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scoutapm_app::settings::{self, CliOverrides};
use scoutapm_app::stdio;
use scoutapm_app::tools::{ToolRouter, TOOL_NAMES};
use scoutapm_core::error::CoreError;
use scoutapm_network::http_client::ScoutHttpClient;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scout APM 도구 클라이언트
#[derive(Parser, Debug)]
#[command(name = "scoutapm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scout API 키 (기본: SCOUT_API_KEY 환경변수)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API 기본 URL (기본: https://scoutapm.com/api)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// JSON 설정 파일 경로
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 도구 이름 목록 출력
    Tools,
    /// 도구 하나 실행 후 결과 JSON 출력
    Call {
        /// 도구 이름
        tool: String,
        /// 인자 JSON 객체
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// stdin 줄 단위 JSON 요청 처리
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout은 JSON 전용이므로 로그는 stderr로
    let log_filter = format!(
        "scoutapm={},scoutapm_app={},scoutapm_core={},scoutapm_network={}",
        args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let overrides = CliOverrides {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        config_path: args.config.clone(),
    };

    match args.command {
        Command::Tools => {
            for name in TOOL_NAMES {
                println!("{name}");
            }
            return Ok(());
        }
        Command::Call { tool, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args는 JSON 객체여야 합니다")?;
            let (client, router) = connect(&overrides)?;
            let result = router.call(&tool, arguments).await;
            client.close();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Serve => {
            let (client, router) = connect(&overrides)?;
            let served =
                stdio::serve(&router, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                    .await;
            client.close();
            served.context("stdio 처리 실패")?;
        }
    }

    info!("Scout APM 클라이언트 종료");
    Ok(())
}

/// 설정 로드 + 클라이언트/라우터 DI 와이어링
fn connect(overrides: &CliOverrides) -> Result<(Arc<ScoutHttpClient>, ToolRouter)> {
    let config = settings::load(overrides).context("설정 로드 실패")?;
    if config.scout.api_key.is_empty() {
        return Err(CoreError::Config(
            "API key is required. Pass --api-key or set SCOUT_API_KEY".to_string(),
        )
        .into());
    }

    info!(
        base_url = %config.scout.base_url,
        api_key = %config.scout.masked_api_key(),
        "Scout APM 클라이언트 시작"
    );

    let client = Arc::new(ScoutHttpClient::new(&config.scout)?);
    let router = ToolRouter::new(client.clone(), &config.tools);
    Ok((client, router))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_subcommand_needs_no_credentials() {
        let args = Args::try_parse_from(["scoutapm", "tools"]).unwrap();
        assert!(matches!(args.command, Command::Tools));
        assert_eq!(args.api_key, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn call_subcommand_defaults_to_empty_args() {
        let args =
            Args::try_parse_from(["scoutapm", "call", "list_apps", "--api-key", "k"]).unwrap();
        assert_eq!(args.api_key.as_deref(), Some("k"));
        match args.command {
            Command::Call { tool, args } => {
                assert_eq!(tool, "list_apps");
                assert_eq!(args, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
