//! Standard I/O transport implementation for MCP.
//!
//! Newline-delimited JSON-RPC: one message per line on stdin, one response
//! per line on stdout. Nothing else may be written to stdout.

use crate::{
    error::Result,
    protocol::{handle_message, parse_error, McpProtocol},
    types::JsonRpcResponse,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Serve the protocol on the process's stdin/stdout until EOF
pub async fn serve_stdio<P>(protocol: &P) -> Result<()>
where
    P: McpProtocol + ?Sized,
{
    info!("Starting MCP server on STDIO");
    serve_lines(
        protocol,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Serve newline-delimited JSON-RPC over any reader/writer pair
pub async fn serve_lines<P, R, W>(protocol: &P, mut reader: R, mut writer: W) -> Result<()>
where
    P: McpProtocol + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break; // EOF
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                debug!("Received: {}", line.trim());
                handle_message(protocol, line).await
            }
            Err(e) => {
                warn!("Discarding non UTF-8 input line: {}", e);
                Some(parse_error(e.to_string()))
            }
        };

        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
    }

    info!("STDIO input closed, shutting down");
    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
