//! Line-oriented event intake.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;

use crate::events::{EventError, RouteEvent};
use crate::registry::RouteRegistry;

/// Counts of processed feed lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeStats {
    pub applied: usize,
    pub rejected: usize,
}

/// Feeds decoded events into a registry.
pub struct EventIntake {
    registry: Arc<RouteRegistry>,
}

impl EventIntake {
    /// Intake that applies events to `registry`.
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry }
    }

    /// Decode and apply one line. Blank lines are ignored.
    pub fn handle_line(&self, line: &str) -> Result<bool, EventError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(false);
        }
        RouteEvent::decode(line)?.apply(&self.registry)?;
        Ok(true)
    }

    /// Consume `reader` until EOF or shutdown.
    ///
    /// Only a read failure ends the intake with an error; bad events are
    /// logged and counted.
    pub async fn run<R>(
        self,
        mut reader: R,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<IntakeStats, EventError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut stats = IntakeStats::default();

        tracing::info!("Event intake starting");
        loop {
            buf.clear();
            tokio::select! {
                read = reader.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        tracing::info!("Event feed closed");
                        break;
                    }
                    let line = match std::str::from_utf8(&buf) {
                        Ok(line) => line,
                        Err(e) => {
                            stats.rejected += 1;
                            tracing::warn!(error = %e, "Skipping event: feed line is not valid UTF-8");
                            continue;
                        }
                    };
                    match self.handle_line(line) {
                        Ok(true) => stats.applied += 1,
                        Ok(false) => {}
                        Err(e) => {
                            stats.rejected += 1;
                            tracing::warn!(error = %e, "Skipping event");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Event intake received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        tracing::info!(applied = stats.applied, rejected = stats.rejected, "Event intake stopped");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::route::Uri;
    use std::time::Duration;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_run_applies_until_eof() {
        let registry = Arc::new(RouteRegistry::new(Duration::ZERO, Duration::from_secs(120)));
        let feed = concat!(
            r#"{"action":"register","host":"10.0.0.1","port":80,"uris":["foo.com"]}"#, "\n",
            "\n",
            "not json\n",
            r#"{"action":"register","host":"","port":80,"uris":["foo.com"]}"#, "\n",
            r#"{"action":"register","host":"10.0.0.2","port":80,"uris":["foo.com"]}"#, "\n",
            r#"{"action":"unregister","host":"10.0.0.1","port":80,"uris":["foo.com"]}"#, "\n",
        );

        let shutdown = Shutdown::new();
        let stats = EventIntake::new(registry.clone())
            .run(BufReader::new(feed.as_bytes()), shutdown.subscribe())
            .await
            .unwrap();

        assert_eq!(stats, IntakeStats { applied: 3, rejected: 2 });
        let view = registry.lookup(&Uri::new("foo.com").unwrap()).unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.contains("10.0.0.2:80"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let registry = Arc::new(RouteRegistry::new(Duration::ZERO, Duration::from_secs(120)));
        let mut feed = b"\xff\xfe garbage\n".to_vec();
        feed.extend_from_slice(
            br#"{"action":"register","host":"10.0.0.1","port":80,"uris":["foo.com"]}"#,
        );
        feed.push(b'\n');

        let shutdown = Shutdown::new();
        let stats = EventIntake::new(registry.clone())
            .run(BufReader::new(feed.as_slice()), shutdown.subscribe())
            .await
            .unwrap();

        assert_eq!(stats, IntakeStats { applied: 1, rejected: 1 });
        assert!(registry.lookup(&Uri::new("foo.com").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_applied() {
        let registry = Arc::new(RouteRegistry::new(Duration::ZERO, Duration::from_secs(120)));
        let feed = r#"{"action":"register","host":"10.0.0.1","port":80,"uris":["foo.com"]}"#;

        let shutdown = Shutdown::new();
        let stats = EventIntake::new(registry.clone())
            .run(BufReader::new(feed.as_bytes()), shutdown.subscribe())
            .await
            .unwrap();

        assert_eq!(stats.applied, 1);
        assert!(registry.lookup(&Uri::new("foo.com").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let registry = Arc::new(RouteRegistry::new(Duration::ZERO, Duration::from_secs(120)));
        let (client, server) = tokio::io::duplex(64);
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();

        let task = tokio::spawn(EventIntake::new(registry).run(BufReader::new(server), rx));
        shutdown.trigger();

        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats, IntakeStats::default());
        drop(client);
    }
}
