//! Submission sinks - where submitted payloads end up

use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use super::SubmissionPayload;

/// Receives payloads produced by [`RuleForm::submit`](super::RuleForm::submit)
pub trait SubmissionSink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<()>;
}

/// Records each payload in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<()> {
        let json = serde_json::to_string(payload).context("Failed to serialize payload")?;
        info!(rule = %payload.rule_name, "Form submitted with data: {}", json);
        Ok(())
    }
}

/// Keeps every payload submitted during the session
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    submissions: Vec<SubmissionPayload>,
}

impl MemorySink {
    pub fn submissions(&self) -> &[SubmissionPayload] {
        &self.submissions
    }

    pub fn last(&self) -> Option<&SubmissionPayload> {
        self.submissions.last()
    }
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<()> {
        self.submissions.push(payload.clone());
        Ok(())
    }
}

/// Writes one JSON document per payload
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SubmissionSink for JsonSink<W> {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, payload)
        } else {
            serde_json::to_writer(&mut self.writer, payload)
        }
        .context("Failed to write payload")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
