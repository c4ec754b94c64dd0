//! Connection lifecycle controller.
//!
//! One control flow drives the board through
//! `Searching -> Validating -> Steady`, falling back through `Backoff`
//! whenever something goes wrong. Decisions come from the pure table in
//! [`phase`]; this module performs the I/O and the waits.
//!
//! ```text
//!            found                 healthy
//! Searching ───────> Validating ───────────> Steady ──┐ cycle
//!   ^  │ missing          │ rejected            │ ^───┘
//!   │  └──┘               │ (close)             │ transport failure (close)
//!   └──── Backoff <───────┴─────────────────────┘
//! ```

pub mod phase;

pub use phase::{Event, Phase, Resume, Transition};

use crate::config::Config;
use crate::discovery::{DevicePatterns, PortLocator};
use crate::link::{BootOutcome, BootValidator, CommandExchanger, Connection, LineReader};
use crate::port::{PortConfiguration, PortError, PortProvider};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Whether the controller currently owns an open link.
///
/// The open connection lives inside the `Connected` variant, so there can
/// never be two.
#[derive(Debug, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected(Connection),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn device(&self) -> Option<&str> {
        match self {
            Self::Connected(connection) => Some(connection.device()),
            Self::Disconnected => None,
        }
    }
}

/// Running totals, mostly for tests and the exit summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStats {
    /// Successful port opens.
    pub connects: u64,
    /// Searches that found nothing.
    pub searches_missed: u64,
    pub boots_rejected: u64,
    pub transport_failures: u64,
    pub unclassified_failures: u64,
    /// Completed on/off cycles.
    pub cycles: u64,
}

/// Timings the controller waits on directly.
#[derive(Debug, Clone, Copy)]
struct Timings {
    retry_interval: Duration,
    connect_settle: Duration,
    on_hold: Duration,
    off_hold: Duration,
}

/// Drives one board through discovery, validation and the command cadence.
pub struct Controller<P: PortProvider> {
    provider: P,
    locator: PortLocator,
    validator: BootValidator,
    exchanger: CommandExchanger,
    port_settings: PortConfiguration,
    activate: String,
    deactivate: String,
    timings: Timings,
    phase: Phase,
    connection: ConnectionState,
    stats: ControllerStats,
}

impl<P: PortProvider> Controller<P> {
    pub fn new(config: &Config, provider: P) -> Self {
        let reader = LineReader::new(config.serial.poll_interval());

        Self {
            provider,
            locator: PortLocator::with_patterns(DevicePatterns::from(&config.discovery)),
            validator: BootValidator::new(&config.boot, reader),
            exchanger: CommandExchanger::new(&config.commands, reader),
            port_settings: PortConfiguration {
                baud_rate: config.serial.baud_rate,
                timeout: config.serial.timeout(),
            },
            activate: config.commands.activate.clone(),
            deactivate: config.commands.deactivate.clone(),
            timings: Timings {
                retry_interval: config.discovery.retry_interval(),
                connect_settle: config.boot.settle(),
                on_hold: config.commands.on_hold(),
                off_hold: config.commands.off_hold(),
            },
            phase: Phase::Searching,
            connection: ConnectionState::Disconnected,
            stats: ControllerStats::default(),
        }
    }

    /// Replace the device heuristic.
    pub fn with_locator(mut self, locator: PortLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run until the future is dropped.
    ///
    /// There is no terminal state: cancellation happens from outside, after
    /// which [`Controller::shutdown`] releases the port.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// Do the work of the current phase and apply the resulting transition.
    pub async fn step(&mut self) -> Phase {
        let event = match self.phase {
            Phase::Searching => self.search().await,
            Phase::Validating => self.validate().await,
            Phase::Steady => self.cycle().await,
            Phase::Backoff { .. } => {
                sleep(self.timings.retry_interval).await;
                Event::BackoffElapsed
            }
        };

        let transition = self.phase.on(event);
        if transition.close_connection {
            self.disconnect();
        }
        if transition.next != self.phase {
            debug!(from = %self.phase, to = %transition.next, ?event, "Phase change");
        }
        self.phase = transition.next;
        debug_assert_eq!(
            self.phase.expects_connection(),
            self.connection.is_connected(),
            "connection out of step with phase {}",
            self.phase
        );
        self.phase
    }

    /// Close the connection if one is open. Safe to call in any phase.
    pub fn shutdown(&mut self) {
        info!("Exiting program");
        self.disconnect();
    }

    fn disconnect(&mut self) {
        if let ConnectionState::Connected(connection) = std::mem::take(&mut self.connection) {
            connection.close();
        }
    }

    async fn search(&mut self) -> Event {
        let device = match self.locator.find_port(&self.provider) {
            Ok(Some(device)) => device,
            Ok(None) => {
                self.stats.searches_missed += 1;
                info!("Board not found. Retrying...");
                sleep(self.timings.retry_interval).await;
                return Event::PortMissing;
            }
            // Enumeration trouble is not a broken link: nothing is open yet.
            Err(e) => return self.unclassified(&e),
        };

        info!("Board found on {}", device);
        // Never hold two handles, even if a previous phase forgot to close.
        self.disconnect();
        match Connection::open(&self.provider, &device, self.port_settings) {
            Ok(connection) => {
                self.stats.connects += 1;
                self.connection = ConnectionState::Connected(connection);
                sleep(self.timings.connect_settle).await;
                Event::PortFound
            }
            Err(e) => self.failed(e),
        }
    }

    async fn validate(&mut self) -> Event {
        let ConnectionState::Connected(connection) = &mut self.connection else {
            return self.failed(PortError::disconnected("no open connection"));
        };

        match self.validator.validate_boot(connection.port_mut()).await {
            Ok(BootOutcome::Healthy) => {
                info!("Starting command cadence");
                Event::BootHealthy
            }
            Ok(BootOutcome::Missing(_)) => {
                self.stats.boots_rejected += 1;
                Event::BootRejected
            }
            Err(e) => self.failed(e),
        }
    }

    async fn cycle(&mut self) -> Event {
        let ConnectionState::Connected(connection) = &mut self.connection else {
            return self.failed(PortError::disconnected("no open connection"));
        };

        info!("Sending '{}' command...", self.activate);
        if let Err(e) = self
            .exchanger
            .send_command(connection.port_mut(), &self.activate)
            .await
        {
            return self.failed(e);
        }
        sleep(self.timings.on_hold).await;

        info!("Sending '{}' command...", self.deactivate);
        if let Err(e) = self
            .exchanger
            .send_command(connection.port_mut(), &self.deactivate)
            .await
        {
            return self.failed(e);
        }
        sleep(self.timings.off_hold).await;

        self.stats.cycles += 1;
        Event::CycleCompleted
    }

    /// Classify a failure into the event the table understands.
    fn failed(&mut self, e: PortError) -> Event {
        if e.is_transport() {
            self.stats.transport_failures += 1;
            warn!("Board disconnected ({}). Reconnecting...", e);
            Event::TransportFailed
        } else {
            self.unclassified(&e)
        }
    }

    fn unclassified(&mut self, e: &dyn std::fmt::Display) -> Event {
        self.stats.unclassified_failures += 1;
        error!("Error: {}", e);
        Event::Unclassified
    }
}

impl<P: PortProvider> std::fmt::Debug for Controller<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("phase", &self.phase)
            .field("device", &self.connection.device())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{MockPortProvider, PortDescriptor};

    fn provider_with_board() -> MockPortProvider {
        let provider = MockPortProvider::new();
        provider.set_devices(vec![PortDescriptor::new("/dev/ttyUSB0", "n/a")]);
        provider.set_boot_lines(Config::default().boot.expected_lines);
        provider
    }

    #[tokio::test(start_paused = true)]
    async fn test_connects_and_validates() {
        let mut controller = Controller::new(&Config::default(), provider_with_board());

        assert_eq!(controller.step().await, Phase::Validating);
        assert!(controller.connection().is_connected());
        assert_eq!(controller.connection().device(), Some("/dev/ttyUSB0"));

        assert_eq!(controller.step().await, Phase::Steady);
        assert_eq!(controller.step().await, Phase::Steady);
        assert_eq!(controller.stats().cycles, 1);

        let port = controller.provider().last_opened().unwrap();
        assert_eq!(port.written_text(), vec!["LED ON\n", "LED OFF\n"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_banner_closes_before_retry() {
        let provider = provider_with_board();
        provider.set_boot_lines(["garbage"]);
        let mut controller = Controller::new(&Config::default(), provider);

        controller.step().await;
        let after = controller.step().await;
        assert_eq!(
            after,
            Phase::Backoff {
                resume: Resume::Searching
            }
        );
        assert!(!controller.connection().is_connected());
        assert!(controller.provider().last_opened().unwrap().is_closed());
        assert_eq!(controller.stats().boots_rejected, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_failure_is_transport() {
        let provider = provider_with_board();
        provider.set_open_failure(true);
        let mut controller = Controller::new(&Config::default(), provider);

        assert_eq!(
            controller.step().await,
            Phase::Backoff {
                resume: Resume::Searching
            }
        );
        assert_eq!(controller.stats().transport_failures, 1);
        assert_eq!(controller.step().await, Phase::Searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enumeration_failure_is_unclassified() {
        let provider = provider_with_board();
        provider.set_list_failure(Some("udev went away"));
        let mut controller = Controller::new(&Config::default(), provider);

        assert_eq!(
            controller.step().await,
            Phase::Backoff {
                resume: Resume::Searching
            }
        );
        assert_eq!(controller.stats().unclassified_failures, 1);
        assert_eq!(controller.stats().transport_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_open_connection() {
        let mut controller = Controller::new(&Config::default(), provider_with_board());
        controller.step().await;
        let port = controller.provider().last_opened().unwrap();

        controller.shutdown();
        assert!(port.is_closed());
        assert!(!controller.connection().is_connected());

        // Idempotent.
        controller.shutdown();
    }
}
