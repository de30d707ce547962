//! Liveness and readiness reporting for `/health` and `/ready`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Body of a `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"` while the process answers.
    pub status: &'static str,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Seconds since the server was built.
    pub uptime_seconds: u64,
}

/// Liveness information for a running service.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    started_at: Instant,
}

impl HealthCheck {
    /// Starts the uptime clock for `service`.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            started_at: Instant::now(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Time since construction.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Builds the current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.uptime().as_secs(),
        }
    }
}

/// Body of a `/ready` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessStatus {
    /// Whether the service accepts traffic.
    pub ready: bool,
    /// Outcome of each named check.
    pub checks: BTreeMap<String, bool>,
}

type Check = Arc<dyn Fn() -> bool + Send + Sync>;

/// Readiness gate: a manual switch plus any number of named checks.
///
/// The server flips the switch off when shutdown begins so that load
/// balancers stop routing new requests.
///
/// ```rust
/// use fastdca_server::ReadinessCheck;
///
/// let readiness = ReadinessCheck::new().with_check("catalogs", || true);
/// assert!(readiness.is_ready());
///
/// readiness.set_ready(false);
/// assert!(!readiness.is_ready());
/// ```
#[derive(Clone)]
pub struct ReadinessCheck {
    checks: Vec<(String, Check)>,
    switch: Arc<AtomicBool>,
}

impl ReadinessCheck {
    /// Creates a ready gate with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            switch: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Adds a named check.
    pub fn add_check(
        &mut self,
        name: impl Into<String>,
        check: impl Fn() -> bool + Send + Sync + 'static,
    ) {
        self.checks.push((name.into(), Arc::new(check)));
    }

    /// Adds a named check, returning the gate for chaining.
    #[must_use]
    pub fn with_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.add_check(name, check);
        self
    }

    /// Sets the manual switch. Clones share the switch.
    pub fn set_ready(&self, ready: bool) {
        self.switch.store(ready, Ordering::SeqCst);
    }

    /// Returns `true` when the switch is on and every check passes.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status().ready
    }

    /// Runs every check and reports the outcome.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        let checks: BTreeMap<String, bool> = self
            .checks
            .iter()
            .map(|(name, check)| (name.clone(), check()))
            .collect();
        let ready = self.switch.load(Ordering::SeqCst) && checks.values().all(|ok| *ok);
        ReadinessStatus { ready, checks }
    }

    /// Returns the number of named checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadinessCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessCheck")
            .field("checks", &self.checks.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("switch", &self.switch.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status() {
        let health = HealthCheck::new("fastdca-demo", "0.1.0");
        let status = health.status();
        assert_eq!(status.status, "healthy");
        assert_eq!(status.service, "fastdca-demo");
        assert_eq!(status.version, "0.1.0");
        assert!(status.uptime_seconds < 5);
    }

    #[test]
    fn test_health_serializes() {
        let json = serde_json::to_value(HealthCheck::new("svc", "1").status()).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["uptime_seconds"].is_u64());
    }

    #[test]
    fn test_failing_check_blocks_readiness() {
        let readiness = ReadinessCheck::new()
            .with_check("catalogs", || true)
            .with_check("credentials", || false);

        let status = readiness.status();
        assert!(!status.ready);
        assert_eq!(status.checks.get("catalogs"), Some(&true));
        assert_eq!(status.checks.get("credentials"), Some(&false));
        assert_eq!(readiness.check_count(), 2);
    }

    #[test]
    fn test_switch_is_shared_between_clones() {
        let readiness = ReadinessCheck::new();
        let clone = readiness.clone();
        clone.set_ready(false);
        assert!(!readiness.is_ready());
        clone.set_ready(true);
        assert!(readiness.is_ready());
    }
}
