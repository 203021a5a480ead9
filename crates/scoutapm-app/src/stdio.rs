//! 줄 단위 JSON 도구 호출 루프.
//!
//! 요청 한 줄: `{"id"?: any, "tool": "...", "arguments"?: {...}}`
//! 응답 한 줄: `{"id": ..., "tool": ..., "result": ...}`
//! 형식이 잘못된 줄은 `{"id": null, "error": "..."}`. 입력 EOF에서 종료.

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::tools::ToolRouter;

/// 도구 호출 요청
#[derive(Debug, Deserialize)]
struct ToolRequest {
    #[serde(default)]
    id: Value,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// 입력이 끝날 때까지 요청을 처리한다
pub async fn serve<R, W>(router: &ToolRouter, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("stdio 도구 서버 시작");
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(router, &line).await;

        let mut out = response.to_string();
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "stdio 입력 종료");
    Ok(())
}

/// 요청 한 줄 처리
pub async fn handle_line(router: &ToolRouter, line: &str) -> Value {
    match serde_json::from_str::<ToolRequest>(line) {
        Ok(request) => {
            debug!(id = %request.id, tool = %request.tool, "요청 수신");
            let result = router.call(&request.tool, request.arguments).await;
            json!({
                "id": request.id,
                "tool": request.tool,
                "result": result,
            })
        }
        Err(e) => {
            warn!("잘못된 요청: {e}");
            json!({ "id": null, "error": format!("Invalid request: {e}") })
        }
    }
}
