use anyhow::{Context, Result};
use log::{debug, error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Write half of a control connection, shared between command handlers.
pub type ControlWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

pub fn control_writer<W>(writer: W) -> ControlWriter
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Sends a response to the client.
pub async fn send_response(writer: &ControlWriter, message: &[u8]) -> Result<(), std::io::Error> {
    debug!("Reply: {}", String::from_utf8_lossy(message).trim_end());
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

/// Sends a multi-line reply: `<code>-<first>`, the body lines as-is, then
/// `<code> <last>`.
pub async fn send_multiline(
    writer: &ControlWriter,
    code: u16,
    first: &str,
    lines: &[String],
    last: &str,
) -> Result<(), std::io::Error> {
    let mut response = format!("{}-{}\r\n", code, first);
    for line in lines {
        response.push_str(line);
        response.push_str("\r\n");
    }
    response.push_str(&format!("{} {}\r\n", code, last));
    send_response(writer, response.as_bytes()).await
}

pub fn load_banner(path: &Path) -> Result<String> {
    let banner = std::fs::read_to_string(path)
        .map_err(|e| {
            error!("Failed to read banner file: {:?}: {}", path, e);
            anyhow::Error::new(e)
        })
        .with_context(|| format!("Failed to read banner file: {:?}", path))?;

    // Check if the file is empty
    if banner.trim().is_empty() {
        error!("Banner file is empty: {:?}", path);
        return Err(anyhow::Error::msg("Banner file is empty."));
    }

    info!("Banner file loaded successfully: {:?}", path);
    Ok(banner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_send_multiline_framing() {
        let (client, server) = tokio::io::duplex(1024);
        let writer = control_writer(server);
        send_multiline(
            &writer,
            211,
            "Features",
            &["PORT".to_string(), "UTF8".to_string()],
            "Features end",
        )
        .await
        .unwrap();
        drop(writer);

        let mut received = String::new();
        let mut client = client;
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(
            received,
            "211-Features\r\nPORT\r\nUTF8\r\n211 Features end\r\n"
        );
    }

    #[test]
    fn test_load_banner_rejects_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("banner.txt");
        std::fs::write(&path, "  \n").unwrap();
        assert!(load_banner(&path).is_err());
        std::fs::write(&path, "Welcome\n").unwrap();
        assert_eq!(load_banner(&path).unwrap(), "Welcome\n");
        assert!(load_banner(&tmp.path().join("missing")).is_err());
    }
}
