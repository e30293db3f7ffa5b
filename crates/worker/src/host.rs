//! Newline-delimited JSON bridge between a host and one worker instance.
//!
//! Each input line is a [`LifecycleEvent`]; each output line is the matching
//! [`EventOutcome`]. Events are handled strictly one at a time.

use std::io;

use offcache_core::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::Worker;
use crate::events::{EventOutcome, LifecycleEvent};

/// Serve events from `reader` until it closes, then wait for background
/// population to finish.
pub async fn serve<R, W>(worker: &Worker, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<LifecycleEvent>(&line) {
            Ok(event) => worker.handle(event).await,
            Err(e) => {
                let error = Error::InvalidInput(format!("malformed event: {e}"));
                tracing::warn!(error = %error, "rejected host event");
                EventOutcome::Failed { event: "unknown".into(), error: error.to_string() }
            }
        };

        let mut json = serde_json::to_vec(&outcome)?;
        json.push(b'\n');
        writer.write_all(&json).await?;
        writer.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "host closed the event stream");
    worker.settle().await;

    Ok(())
}
