// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Health-check callback and progress reporting for the health loop.

use crate::constants::health::{REPORT_EVERY_CHECKS, REPORT_MAX_SILENCE_SECS};
use crate::types::edgedevice::EdgeDevicePhase;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::error;

/// A callback that reports the current phase of the device
#[derive(Clone)]
pub struct HealthChecker(Arc<dyn Fn() -> EdgeDevicePhase + Send + Sync>);

impl HealthChecker {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn() -> EdgeDevicePhase + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn check(&self) -> EdgeDevicePhase {
        (self.0)()
    }

    /// Run the callback on the blocking thread pool so slow or blocking
    /// checks do not stall the runtime. A panicking callback reports `Failed`.
    pub async fn check_blocking(&self) -> EdgeDevicePhase {
        let checker = self.clone();
        match tokio::task::spawn_blocking(move || checker.check()).await {
            Ok(phase) => phase,
            Err(e) => {
                error!("Health checker failed: {}", e);
                EdgeDevicePhase::Failed
            }
        }
    }
}

impl fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HealthChecker(..)")
    }
}

impl<F> From<F> for HealthChecker
where
    F: Fn() -> EdgeDevicePhase + Send + Sync + 'static,
{
    fn from(check: F) -> Self {
        Self::new(check)
    }
}

/// Decides which health checks get reported at info level
#[derive(Debug)]
pub struct HealthReporter {
    checks: u64,
    last_report: Option<Instant>,
}

impl HealthReporter {
    pub fn new() -> Self {
        Self {
            checks: 0,
            last_report: None,
        }
    }

    /// Count one check. Returns the check number when it should be reported.
    pub fn record(&mut self, now: Instant) -> Option<u64> {
        self.checks += 1;

        let silent_too_long = self.last_report.map_or(true, |last| {
            now.duration_since(last) > Duration::from_secs(REPORT_MAX_SILENCE_SECS)
        });

        if self.checks % REPORT_EVERY_CHECKS == 0 || silent_too_long {
            self.last_report = Some(now);
            Some(self.checks)
        } else {
            None
        }
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }
}

impl Default for HealthReporter {
    fn default() -> Self {
        Self::new()
    }
}
