use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use super::ring::RingBytes;

#[derive(Debug)]
pub struct LineTap {
    pub line: String,
    pub stream: LineStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStream {
    Stdout,
    Stderr,
}

impl LineStream {
    fn label(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Split a child stream into lines and forward them until EOF.
///
/// Raw bytes are also copied into `ring` when given. The pump runs detached; the channel
/// closing (every sender dropped) is the completion signal. An io error ends it early and is
/// logged.
pub fn pump<R>(
    mut rd: R,
    stream: LineStream,
    ring: Option<Arc<RingBytes>>,
    line_tx: mpsc::Sender<LineTap>,
    task: String,
)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let total = forward(&mut rd, stream, ring.as_deref(), &line_tx, &task).await;
        tracing::debug!(target: "qcheck::task", task = %task, stream = stream.label(), bytes = total, "tool stream closed");
    });
}

async fn forward<R>(
    rd: &mut R,
    stream: LineStream,
    ring: Option<&RingBytes>,
    line_tx: &mpsc::Sender<LineTap>,
    task: &str,
) -> u64
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = vec![0u8; 16 * 1024];
    let mut total = 0u64;
    let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);

    loop {
        let n = match rd.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(target: "qcheck::task", task, stream = stream.label(), error = %e, "reading tool output failed");
                break;
            }
        };

        if let Some(ring) = ring {
            ring.push(&buf[..n]);
        }
        total += n as u64;

        line_buf.extend_from_slice(&buf[..n]);
        while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
            let mut one = line_buf.drain(..=pos).collect::<Vec<u8>>();
            trim_newline(&mut one);
            let line = String::from_utf8_lossy(&one).to_string();
            if line_tx.send(LineTap { line, stream }).await.is_err() {
                return total;
            }
        }
    }

    // EOF flush: deliver the last partial line if it doesn't end with '\n'.
    if !line_buf.is_empty() {
        trim_newline(&mut line_buf);
        if !line_buf.is_empty() {
            let line = String::from_utf8_lossy(&line_buf).to_string();
            let _ = line_tx.send(LineTap { line, stream }).await;
        }
    }

    total
}

fn trim_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn flushes_last_line_without_newline_on_eof() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let ring = RingBytes::new(1024);
        let (tx, mut rx) = mpsc::channel::<LineTap>(8);

        pump(rd, LineStream::Stderr, Some(ring.clone()), tx, "t".into());

        wr.write_all(b"first\r\nhello").await.unwrap();
        drop(wr);

        let tap = rx.recv().await.expect("expected first line");
        assert_eq!(tap.line, "first");
        let tap = rx.recv().await.expect("expected trailing line");
        assert_eq!(tap.line, "hello");
        assert_eq!(tap.stream, LineStream::Stderr);

        assert!(rx.recv().await.is_none());
        assert_eq!(ring.to_string_lossy(), "first\r\nhello");
    }
}
