//! Boot banner validation.
//!
//! After a reset the board prints a fixed banner. Seeing every expected
//! fragment in the lines read right after connecting is the readiness signal.

use super::reader::LineReader;
use crate::config::BootConfig;
use crate::port::{PortError, SerialPortAdapter};
use std::time::Duration;
use tracing::{info, warn};

/// Fragments that must each appear in some received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootExpectation {
    fragments: Vec<String>,
}

/// Result of checking received lines against a [`BootExpectation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    Healthy,
    /// The first expected fragment, in order, that no line contained.
    Missing(String),
}

impl BootOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl BootExpectation {
    pub fn new<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// Check in order, stopping at the first fragment nothing contains.
    pub fn check<S: AsRef<str>>(&self, lines: &[S]) -> BootOutcome {
        for fragment in &self.fragments {
            if !lines.iter().any(|line| line.as_ref().contains(fragment.as_str())) {
                return BootOutcome::Missing(fragment.clone());
            }
        }
        BootOutcome::Healthy
    }
}

impl Default for BootExpectation {
    fn default() -> Self {
        Self::new(BootConfig::default().expected_lines)
    }
}

#[derive(Debug, Clone)]
pub struct BootValidator {
    expectation: BootExpectation,
    window: Duration,
    max_lines: usize,
    reader: LineReader,
}

impl BootValidator {
    pub fn new(config: &BootConfig, reader: LineReader) -> Self {
        Self {
            expectation: BootExpectation::new(config.expected_lines.iter().cloned()),
            window: config.window(),
            max_lines: config.max_lines,
            reader,
        }
    }

    /// Read the banner window and check it.
    ///
    /// Every received line is logged. A missing fragment is an outcome, not
    /// an error; only transport failures come back as `Err`.
    pub async fn validate_boot(
        &self,
        port: &mut dyn SerialPortAdapter,
    ) -> Result<BootOutcome, PortError> {
        info!("Waiting for boot info from {}...", port.name());
        let lines = self
            .reader
            .read_lines(port, self.window, self.max_lines)
            .await?;

        info!("Boot output ({} line(s)):", lines.len());
        for line in &lines {
            info!(device = %port.name(), "-> {}", line);
        }

        let outcome = self.expectation.check(&lines);
        match &outcome {
            BootOutcome::Healthy => info!("Boot info validated"),
            BootOutcome::Missing(fragment) => warn!("Missing boot line: {}", fragment),
        }
        Ok(outcome)
    }
}
