//! Port discovery.
//!
//! `PortLocator` picks the first enumerated device accepted by its predicate.
//! The stock predicate is a case-sensitive substring heuristic on the device
//! description and path; tests and callers with unusual hardware can plug in
//! their own.

use crate::config::DiscoveryConfig;
use crate::port::{PortDescriptor, PortError, PortProvider};
use tracing::debug;

/// Decides whether an enumerated device is the board we want.
pub type PortPredicate = Box<dyn Fn(&PortDescriptor) -> bool + Send + Sync>;

/// Substring patterns for the default predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePatterns {
    /// Matched against `PortDescriptor::description`.
    pub description: Vec<String>,
    /// Matched against `PortDescriptor::device`.
    pub path: Vec<String>,
}

impl DevicePatterns {
    pub fn matches(&self, port: &PortDescriptor) -> bool {
        self.description
            .iter()
            .any(|p| port.description.contains(p.as_str()))
            || self.path.iter().any(|p| port.device.contains(p.as_str()))
    }
}

impl From<&DiscoveryConfig> for DevicePatterns {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            description: config.description_patterns.clone(),
            path: config.path_patterns.clone(),
        }
    }
}

pub struct PortLocator {
    predicate: PortPredicate,
}

impl PortLocator {
    /// Locator using the substring heuristic.
    pub fn with_patterns(patterns: DevicePatterns) -> Self {
        Self::with_predicate(move |port: &PortDescriptor| patterns.matches(port))
    }

    /// Locator using an arbitrary predicate.
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&PortDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// First device in `ports` the predicate accepts.
    pub fn select<'a>(&self, ports: &'a [PortDescriptor]) -> Option<&'a PortDescriptor> {
        ports.iter().find(|port| (self.predicate)(port))
    }

    /// Enumerate through `provider` and return the matching device path.
    ///
    /// `Ok(None)` means nothing matched, which is an ordinary outcome.
    pub fn find_port(&self, provider: &dyn PortProvider) -> Result<Option<String>, PortError> {
        let ports = provider.list_ports()?;
        for port in &ports {
            debug!(device = %port.device, description = %port.description, "Seen serial port");
        }
        Ok(self.select(&ports).map(|port| port.device.clone()))
    }
}

impl Default for PortLocator {
    fn default() -> Self {
        Self::with_patterns(DevicePatterns::from(&DiscoveryConfig::default()))
    }
}

impl std::fmt::Debug for PortLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortLocator").finish_non_exhaustive()
    }
}
