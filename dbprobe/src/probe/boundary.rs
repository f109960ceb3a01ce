//! Boundary probe implementation driving insert/select scenarios.

use std::time::Instant;

use log::debug;
use regex::bytes::Regex;

use super::report::ProbeReport;
use super::{
    EXIT_COMMAND, MAX_EMAIL_LEN, MAX_USERNAME_LEN, SELECT_COMMAND, TABLE_FULL_MARKER,
};
use crate::channel::{ProcessChannel, ResponseBuffer};
use crate::error::{ChannelError, Result};
use crate::transport::ProcessConfig;

/// Drives boundary scenarios against one subordinate REPL session.
///
/// The probe composes command lines, sends them over a [`ProcessChannel`],
/// and judges the returned text against expected markers. Scans are
/// substring searches over concatenated raw output; the first `Table full`
/// sighting wins over reaching numeric capacity.
pub struct BoundaryProbe {
    channel: ProcessChannel,
}

impl BoundaryProbe {
    /// Spawn the subordinate and attach a probe to it.
    pub fn open(config: ProcessConfig) -> Result<Self> {
        Ok(Self {
            channel: ProcessChannel::open(config)?,
        })
    }

    /// Capacity-template insert: the row id is reused in the username and
    /// email fields so a later `select` can identify the row verbatim.
    fn insert_command(id: usize) -> String {
        format!("insert {id} username{id} username{id}@test.com")
    }

    /// Fixed insert carrying a maximum-length username and email.
    fn field_command() -> String {
        format!(
            "insert 1 {} {}",
            "a".repeat(MAX_USERNAME_LEN),
            "a".repeat(MAX_EMAIL_LEN)
        )
    }

    /// One insert for `id` followed by a `select`, surfacing the combined
    /// output as evidence. Diagnostic only: the report always passes.
    pub async fn smoke_test(&mut self, id: usize) -> Result<ProbeReport> {
        let start = Instant::now();
        let mut combined = String::new();

        self.channel.send(&Self::insert_command(id)).await?;
        combined.push_str(&self.channel.receive().await?);
        self.channel.send(SELECT_COMMAND).await?;
        combined.push_str(&self.channel.receive().await?);

        debug!("smoke test {id}: {} bytes of output", combined.len());
        Ok(ProbeReport::passed(
            "smoke",
            format!("insert/select round trip for row {id}"),
            combined,
            start.elapsed(),
        ))
    }

    /// Probe the subordinate's maximum row count.
    ///
    /// Inserts rows `0..max_rows` one at a time, scanning the accumulated
    /// output for `Table full` after every insert. A sighting before
    /// `max_rows` insertions fails the probe early. If the loop completes,
    /// one more insert past the boundary must produce the marker in its
    /// own (fresh, non-accumulated) response to pass.
    ///
    /// Consumes the probe: this scenario terminates the session via
    /// `.exit` on every path.
    pub async fn table_capacity(mut self, max_rows: usize) -> Result<ProbeReport> {
        let start = Instant::now();
        let mut accumulated = ResponseBuffer::new();

        for id in 0..max_rows {
            self.channel.send(&Self::insert_command(id)).await?;
            let chunk = self.channel.receive().await?;
            accumulated.extend(chunk.as_bytes());

            if accumulated.scan_for(TABLE_FULL_MARKER) {
                debug!("table full at row {id}, capacity {max_rows} not reached");
                let report = ProbeReport::failed(
                    "table-capacity",
                    format!(
                        "table full before reaching theoretical capacity (row {id} of {max_rows})"
                    ),
                    accumulated.take_string(),
                    start.elapsed(),
                );
                self.close().await?;
                return Ok(report);
            }
        }

        // One insert past the boundary, judged on its own response only.
        self.channel.send(&Self::insert_command(max_rows + 1)).await?;
        let response = self.channel.receive().await?;

        let report = if response.contains(TABLE_FULL_MARKER) {
            ProbeReport::passed(
                "table-capacity",
                format!("table full at the expected boundary of {max_rows} rows"),
                response,
                start.elapsed(),
            )
        } else {
            ProbeReport::failed(
                "table-capacity",
                format!("exceeded table limitation of {max_rows} rows"),
                response,
                start.elapsed(),
            )
        };
        self.close().await?;
        Ok(report)
    }

    /// Probe maximum-length field storage.
    ///
    /// Inserts a row with a 32-character username and a 255-character
    /// email, then selects. Passes only if the combined output contains
    /// both full-length runs, i.e. neither field was truncated.
    pub async fn field_capacity(&mut self) -> Result<ProbeReport> {
        let start = Instant::now();
        let mut combined = ResponseBuffer::new();

        self.channel.send(&Self::field_command()).await?;
        combined.extend(self.channel.receive().await?.as_bytes());
        self.channel.send(SELECT_COMMAND).await?;
        combined.extend(self.channel.receive().await?.as_bytes());

        let email_run = Regex::new(&format!("a{{{MAX_EMAIL_LEN}}}"))
            .map_err(ChannelError::InvalidPattern)?;
        let username_run = Regex::new(&format!("a{{{MAX_USERNAME_LEN}}}"))
            .map_err(ChannelError::InvalidPattern)?;

        let intact = combined.search_full(&email_run).is_some()
            && combined.search_full(&username_run).is_some();
        let evidence = combined.take_string();

        Ok(if intact {
            ProbeReport::passed(
                "field-capacity",
                "both maximum-length fields survived the round trip",
                evidence,
                start.elapsed(),
            )
        } else {
            ProbeReport::failed(
                "field-capacity",
                "stored fields were truncated or corrupted",
                evidence,
                start.elapsed(),
            )
        })
    }

    /// Check whether the subordinate is still running.
    pub fn is_alive(&mut self) -> bool {
        self.channel.is_alive()
    }

    /// Terminate the session via the REPL's exit command.
    pub async fn close(self) -> Result<()> {
        self.channel.close(EXIT_COMMAND).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Fake REPL with a hard row limit, speaking the subordinate's protocol.
    fn fake_db(limit: usize) -> ProcessConfig {
        let script = format!(
            r#"
rows=0
while IFS= read -r line; do
  case "$line" in
    ".exit") exit 0 ;;
    "select")
      i=0
      while [ "$i" -lt "$rows" ]; do
        echo "($i, username$i, username$i@test.com)"
        i=$((i+1))
      done
      echo "Executed."
      ;;
    insert*)
      if [ "$rows" -ge {limit} ]; then
        echo "Error: Table full."
      else
        rows=$((rows+1))
        echo "Executed."
      fi
      ;;
  esac
done
"#,
            limit = limit
        );
        ProcessConfig::new("sh")
            .args(["-c", script.as_str()])
            .read_timeout(Duration::from_secs(2))
            .exit_timeout(Duration::from_millis(500))
    }

    /// Fake REPL storing one row's actual fields, optionally truncating them.
    fn fake_field_db(truncate: bool) -> ProcessConfig {
        let assign = if truncate {
            r#"u=$(printf %.8s "$3"); e=$(printf %.8s "$4")"#
        } else {
            r#"u=$3; e=$4"#
        };
        let script = format!(
            r#"
u=""
e=""
while IFS= read -r line; do
  case "$line" in
    ".exit") exit 0 ;;
    "select")
      if [ -n "$u" ]; then echo "(1, $u, $e)"; fi
      echo "Executed."
      ;;
    insert*)
      set -- $line
      {assign}
      echo "Executed."
      ;;
  esac
done
"#
        );
        ProcessConfig::new("sh")
            .args(["-c", script.as_str()])
            .read_timeout(Duration::from_secs(2))
            .exit_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_command_templates() {
        assert_eq!(
            BoundaryProbe::insert_command(5),
            "insert 5 username5 username5@test.com"
        );
        let field = BoundaryProbe::field_command();
        assert!(field.starts_with("insert 1 "));
        assert!(field.contains(&"a".repeat(MAX_USERNAME_LEN)));
        assert!(field.ends_with(&"a".repeat(MAX_EMAIL_LEN)));
    }

    #[tokio::test]
    async fn test_smoke_round_trip() {
        let mut probe = BoundaryProbe::open(fake_db(100)).expect("spawn");
        let report = probe.smoke_test(0).await.expect("smoke");
        assert!(report.is_passed());
        assert!(!report.evidence.is_empty());
        probe.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_table_capacity_at_expected_boundary() {
        let probe = BoundaryProbe::open(fake_db(3)).expect("spawn");
        let report = probe.table_capacity(3).await.expect("capacity");
        assert!(report.is_passed());
        assert!(report.message.contains("expected boundary"));
        assert!(report.contains(TABLE_FULL_MARKER));
    }

    #[tokio::test]
    async fn test_table_capacity_full_early() {
        let probe = BoundaryProbe::open(fake_db(2)).expect("spawn");
        let report = probe.table_capacity(5).await.expect("capacity");
        assert!(!report.is_passed());
        assert!(report.message.contains("before reaching theoretical capacity"));
    }

    #[tokio::test]
    async fn test_table_capacity_exceeded() {
        // No limit within reach: the probe past the boundary still succeeds.
        let probe = BoundaryProbe::open(fake_db(1000)).expect("spawn");
        let report = probe.table_capacity(3).await.expect("capacity");
        assert!(!report.is_passed());
        assert!(report.message.contains("exceeded table limitation"));
    }

    #[tokio::test]
    async fn test_select_idempotent_without_inserts() {
        use crate::channel::ProcessChannel;

        let mut channel = ProcessChannel::open(fake_db(10)).expect("spawn");
        channel.send("insert 0 username0 username0@test.com").await.expect("send");
        channel.receive().await.expect("receive");

        // Repeated selects with no intervening insert return identical text.
        channel.send(SELECT_COMMAND).await.expect("send");
        let first = channel.read_until_marker("Executed.").await.expect("read");
        channel.send(SELECT_COMMAND).await.expect("send");
        let second = channel.read_until_marker("Executed.").await.expect("read");
        assert_eq!(first, second);
        assert!(first.contains("username0@test.com"));

        channel.close(EXIT_COMMAND).await.expect("close");
    }

    #[tokio::test]
    async fn test_field_capacity_intact() {
        let mut probe = BoundaryProbe::open(fake_field_db(false)).expect("spawn");
        let report = probe.field_capacity().await.expect("field");
        assert!(report.is_passed());
        probe.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_field_capacity_truncated() {
        let mut probe = BoundaryProbe::open(fake_field_db(true)).expect("spawn");
        let report = probe.field_capacity().await.expect("field");
        assert!(!report.is_passed());
        probe.close().await.expect("close");
    }
}
