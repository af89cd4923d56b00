//! Line-delimited stdio transport
//!
//! Each incoming line is handled on its own task so slow upstream calls do
//! not block the session. All responses go through a single writer task,
//! one JSON document per line.
//!
//! End of input lets in-flight calls finish. Cancelling the shutdown token
//! stops reading at once; calls still waiting on upstream then resolve to
//! cancellation and are dropped without a response.

use crate::dispatch::Dispatcher;
use crate::error::ServerError;
use crate::protocol::Response;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Serve requests from `reader`, writing responses to `writer`
///
/// Returns once input ends (after draining in-flight calls) or the shutdown
/// token fires.
///
/// # Errors
///
/// Returns `ServerError` if reading, writing or serialising fails, or if
/// a handler task panics.
pub async fn serve<R, W>(
    dispatcher: Arc<Dispatcher>,
    reader: R,
    writer: W,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Response>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut lines = BufReader::new(reader).lines();
    let mut tasks = JoinSet::new();

    loop {
        let line = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                info!("Shutdown requested, no longer reading input");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            info!("Input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        tasks.spawn(async move {
            if let Some(response) = dispatcher.handle_line(&line).await {
                // Receiver only closes once the writer has failed
                let _ = tx.send(response);
            }
        });

        while let Some(finished) = tasks.try_join_next() {
            finished?;
        }
    }

    debug!(in_flight = tasks.len(), "Waiting for in-flight calls");
    while let Some(finished) = tasks.join_next().await {
        finished?;
    }

    drop(tx);
    writer_task.await?
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Response>,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use fred_mcp_client::{FredClient, FredConfig};
    use fred_mcp_tools::ToolRegistry;
    use serde_json::Value;
    use tokio::io::AsyncReadExt;

    fn dispatcher() -> Arc<Dispatcher> {
        let client = FredClient::new(FredConfig::new("key"));
        Arc::new(Dispatcher::new(ToolRegistry::with_fred_tools(client)))
    }

    async fn run(input: &str, shutdown: CancellationToken) -> Vec<Value> {
        let (writer, mut output) = tokio::io::duplex(1 << 20);
        serve(dispatcher(), input.as_bytes(), writer, shutdown)
            .await
            .unwrap();

        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        text.lines().map(|line| serde_json::from_str(line).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"missing"}}"#,
            "\n",
        );
        let mut responses = run(input, CancellationToken::new()).await;
        responses.sort_by_key(|response| response["id"].as_i64().unwrap_or(0));

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["result"], serde_json::json!({}));
        assert_eq!(responses[2]["result"]["isError"], true);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_reading() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let responses = run("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n", shutdown).await;
        assert!(responses.is_empty());
    }
}
