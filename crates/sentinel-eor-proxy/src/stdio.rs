//! Newline-delimited JSON-RPC over a byte stream.
//!
//! Each line read is one message, taken as raw bytes. Messages are
//! dispatched concurrently; responses are written by a single task so lines
//! never interleave, in completion order. The loop ends at end of input once
//! every in-flight request has been answered.

use crate::error::ProtocolError;
use crate::mcp::{JsonRpcResponse, McpDispatcher};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Serve MCP requests read from `reader`, writing responses to `writer`.
///
/// # Errors
///
/// Returns `ProtocolError` if reading or writing the stream fails.
pub async fn serve<R, W>(
    dispatcher: Arc<McpDispatcher>,
    reader: R,
    writer: W,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(rx, writer));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(ProtocolError::Io(e)),
        }

        // Raw bytes: undecodable lines are answered by the dispatcher, not fatal here.
        let message = buf.trim_ascii();
        if message.is_empty() {
            continue;
        }

        let dispatcher = dispatcher.clone();
        let tx = tx.clone();
        let message = message.to_vec();
        tokio::spawn(async move {
            if let Some(response) = dispatcher.handle_message(&message).await {
                // Receiver only disappears after a write failure, which is reported below.
                let _ = tx.send(response);
            }
        });
    };

    // In-flight tasks hold their own senders; the writer finishes after the last one.
    drop(tx);

    let write_result = writer_task
        .await
        .map_err(|e| ProtocolError::Io(std::io::Error::other(e)))?;

    read_result?;
    write_result
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> Result<(), ProtocolError>
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
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sentinel_eor_forwarder::{Forward, Operation, QueryParameters};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    /// Answers `get_countries` slowly so later requests can overtake it.
    struct SlowCountries;

    #[async_trait]
    impl Forward for SlowCountries {
        async fn forward(
            &self,
            operation: Operation,
            _params: &QueryParameters,
        ) -> sentinel_eor_forwarder::Result<Value> {
            if operation == Operation::GetCountries {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(json!({ "operation": operation.as_str() }))
        }
    }

    async fn run(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let dispatcher = Arc::new(McpDispatcher::new(Arc::new(SlowCountries)));
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);

        client_write.write_all(input).await.unwrap();
        client_write.shutdown().await.unwrap();

        serve(dispatcher, server_read, server_write).await.unwrap();

        let mut output = String::new();
        client_read.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n   \n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );

        let mut responses = run(input).await;
        responses.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_slow_request_does_not_block_others() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":"slow","method":"tools/call","params":{"name":"get_countries"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"fast","method":"tools/call","params":{"name":"get_metadata"}}"#,
            "\n",
        );

        let responses = run(input).await;
        let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("fast"), json!("slow")]);
    }

    #[tokio::test]
    async fn test_garbage_line_gets_parse_error() {
        let input = concat!(
            "this is not json\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
            "\n",
        );

        let mut responses = run(input).await;
        responses.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_transport() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let mut responses = run_bytes(&input).await;
        responses.sort_by_key(|r| r["id"].as_i64());

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], 1);
        assert_eq!(responses[2]["id"], 2);
        assert_eq!(responses[2]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_empty_input_finishes() {
        assert!(run("").await.is_empty());
    }
}
