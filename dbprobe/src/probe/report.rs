//! Structured probe results.

use std::time::Duration;

/// Verdict of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The subordinate behaved as expected at the boundary.
    Passed,

    /// The subordinate violated the expected boundary behavior.
    Failed,
}

/// Report from one probe run: the verdict plus the raw output text that
/// produced it.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Name of the probe that produced this report.
    pub probe: String,

    /// The verdict.
    pub outcome: ProbeOutcome,

    /// Human-readable explanation of the verdict.
    pub message: String,

    /// Raw subordinate output the verdict was judged against.
    pub evidence: String,

    /// Time taken to run the probe.
    pub elapsed: Duration,
}

impl ProbeReport {
    /// Create a passing report.
    pub fn passed(
        probe: impl Into<String>,
        message: impl Into<String>,
        evidence: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            probe: probe.into(),
            outcome: ProbeOutcome::Passed,
            message: message.into(),
            evidence: evidence.into(),
            elapsed,
        }
    }

    /// Create a failing report.
    pub fn failed(
        probe: impl Into<String>,
        message: impl Into<String>,
        evidence: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            probe: probe.into(),
            outcome: ProbeOutcome::Failed,
            message: message.into(),
            evidence: evidence.into(),
            elapsed,
        }
    }

    /// Check if the probe passed.
    pub fn is_passed(&self) -> bool {
        self.outcome == ProbeOutcome::Passed
    }

    /// Check if the evidence contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.evidence.contains(pattern)
    }
}

impl std::fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = match self.outcome {
            ProbeOutcome::Passed => "PASS",
            ProbeOutcome::Failed => "FAIL",
        };
        write!(
            f,
            "[{verdict}] {}: {} ({:.1?})",
            self.probe, self.message, self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_report() {
        let report = ProbeReport::passed(
            "field-capacity",
            "both maximum-length fields survived",
            "db > Executed.",
            Duration::from_millis(120),
        );
        assert!(report.is_passed());
        assert!(report.contains("Executed."));
    }

    #[test]
    fn test_failed_report_display() {
        let report = ProbeReport::failed(
            "table-capacity",
            "exceeded table limitation",
            "db > Executed.",
            Duration::from_secs(3),
        );
        assert!(!report.is_passed());
        let rendered = report.to_string();
        assert!(rendered.starts_with("[FAIL] table-capacity:"));
        assert!(rendered.contains("exceeded table limitation"));
    }
}
