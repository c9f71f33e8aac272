//! The Grouper and Sink boundary.
//!
//! Log parsing/normalization and durable persistence are out of scope
//! (spec §1): `PairSource` and `OutputSink` are the narrow traits a
//! real Grouper/Sink would implement, and `JsonLinesSource`/
//! `JsonLinesSink` are deliberately thin pass-throughs over a wire
//! format this crate already owns (one JSON object per line), not a
//! Bro/Zeek log parser or a database client.

use std::path::Path;

use async_trait::async_trait;
use beacon_proto::{BeaconOutput, GlobalWindow, PairInput};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{SinkError, SourceError};

/// Produces the run's `GlobalWindow` once, then yields `PairInput`
/// records until exhausted.
#[async_trait]
pub trait PairSource: Send {
    async fn global_window(&mut self) -> Result<GlobalWindow, SourceError>;
    async fn recv(&mut self) -> Result<Option<PairInput>, SourceError>;
}

/// Consumes `BeaconOutput` records. Ordering is not guaranteed by the
/// caller (spec §5): a sink must not assume arrival order correlates
/// with anything.
#[async_trait]
pub trait OutputSink: Send {
    async fn send(&mut self, output: BeaconOutput) -> Result<(), SinkError>;
}

/// A `PairSource` reading a file whose first line is a `GlobalWindow`
/// and every subsequent line is a `PairInput`, one JSON object per
/// line.
pub struct JsonLinesSource<R> {
    lines: tokio::io::Lines<BufReader<R>>,
}

impl JsonLinesSource<tokio::fs::File> {
    pub async fn open(path: &Path) -> Result<Self, SourceError> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(file))
    }
}

impl<R: tokio::io::AsyncRead + Unpin> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait]
impl<R: tokio::io::AsyncRead + Unpin + Send> PairSource for JsonLinesSource<R> {
    async fn global_window(&mut self) -> Result<GlobalWindow, SourceError> {
        let line = self.lines.next_line().await?.ok_or(SourceError::MissingWindow)?;
        let window: GlobalWindow = serde_json::from_str(&line)?;
        // `GlobalWindow`'s fields are public so serde's derived `Deserialize`
        // builds one without going through `GlobalWindow::new`; re-check its
        // precondition here rather than trusting the wire.
        if window.max_time <= window.min_time {
            return Err(SourceError::InvalidWindow {
                min_time: window.min_time,
                max_time: window.max_time,
            });
        }
        Ok(window)
    }

    async fn recv(&mut self) -> Result<Option<PairInput>, SourceError> {
        loop {
            match self.lines.next_line().await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
                None => return Ok(None),
            }
        }
    }
}

/// An `OutputSink` writing one JSON object per line.
pub struct JsonLinesSink<W> {
    writer: BufWriter<W>,
}

impl JsonLinesSink<tokio::fs::File> {
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(file))
    }
}

impl JsonLinesSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: tokio::io::AsyncWrite + Unpin> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }
}

#[async_trait]
impl<W: tokio::io::AsyncWrite + Unpin + Send> OutputSink for JsonLinesSink<W> {
    async fn send(&mut self, output: BeaconOutput) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(&output)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_lines_source_reads_window_then_pairs() {
        let body = concat!(
            "{\"min_time\":0,\"max_time\":1000}\n",
            "{\"uconnID\":[1,2],\"ts\":[1,2,3],\"origIPBytes\":[10,20]}\n",
        );
        let mut source = JsonLinesSource::new(std::io::Cursor::new(body.as_bytes()));
        let window = source.global_window().await.unwrap();
        assert_eq!(window, GlobalWindow::new(0, 1000));

        let pair = source.recv().await.unwrap().unwrap();
        assert_eq!(pair.ts, vec![1, 2, 3]);
        assert!(source.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_lines_source_rejects_non_positive_window_span() {
        let body = "{\"min_time\":1000,\"max_time\":1000}\n";
        let mut source = JsonLinesSource::new(std::io::Cursor::new(body.as_bytes()));
        let err = source.global_window().await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidWindow { min_time: 1000, max_time: 1000 }));
    }

    #[tokio::test]
    async fn json_lines_source_skips_blank_lines() {
        let body = concat!(
            "{\"min_time\":0,\"max_time\":1000}\n",
            "\n",
            "{\"uconnID\":[1],\"ts\":[1,2],\"origIPBytes\":[10]}\n",
        );
        let mut source = JsonLinesSource::new(std::io::Cursor::new(body.as_bytes()));
        source.global_window().await.unwrap();
        let pair = source.recv().await.unwrap().unwrap();
        assert_eq!(pair.uconn_id, vec![1]);
    }

    #[tokio::test]
    async fn json_lines_sink_emits_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let output = BeaconOutput {
            uconn_id: vec![1],
            ts: beacon_proto::TimestampStats {
                skew: 0.0,
                dispersion: 0,
                duration: 1.0,
                range: 0,
                mode: 1,
                mode_count: 1,
                intervals: vec![1],
                interval_counts: vec![1],
                score: 1.0,
            },
            ds: beacon_proto::SizeStats {
                skew: 0.0,
                dispersion: 0,
                range: 0,
                mode: 10,
                mode_count: 1,
                sizes: vec![10],
                size_counts: vec![1],
                score: 1.0,
            },
            score: 1.0,
        };
        sink.send(output).await.unwrap();

        let buf = sink.writer.into_inner();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("uconnID"));
    }
}
