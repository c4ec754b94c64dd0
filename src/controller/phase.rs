//! Lifecycle phases and the transition table.
//!
//! `Phase::on` is a pure function: given where the controller is and what just
//! happened, it says where to go next and whether the connection must be
//! closed on the way. All I/O lives in the controller.

use std::fmt;

/// Where a backoff wait hands control back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Searching,
    Validating,
    Steady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Looking for a matching device.
    Searching,
    /// Connected; checking the boot banner.
    Validating,
    /// Banner seen; running the on/off cadence.
    Steady,
    /// Waiting out the retry interval before resuming.
    Backoff { resume: Resume },
}

/// What the last unit of work in a phase produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A device matched and the connection is open.
    PortFound,
    /// No device matched; the retry interval has already been waited.
    PortMissing,
    BootHealthy,
    BootRejected,
    /// One full on/off cycle finished.
    CycleCompleted,
    /// The link broke, or a device could not be opened.
    TransportFailed,
    /// Any other failure. The current phase is retried after the interval.
    Unclassified,
    BackoffElapsed,
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Phase,
    /// Close the connection before entering `next`.
    pub close_connection: bool,
}

impl Transition {
    fn to(next: Phase) -> Self {
        Self {
            next,
            close_connection: false,
        }
    }

    fn closing(next: Phase) -> Self {
        Self {
            next,
            close_connection: true,
        }
    }
}

impl From<Resume> for Phase {
    fn from(resume: Resume) -> Self {
        match resume {
            Resume::Searching => Phase::Searching,
            Resume::Validating => Phase::Validating,
            Resume::Steady => Phase::Steady,
        }
    }
}

impl Phase {
    /// The transition table.
    ///
    /// Events that cannot occur in a phase leave it unchanged.
    pub fn on(self, event: Event) -> Transition {
        use Event::*;

        let retry_search = Phase::Backoff {
            resume: Resume::Searching,
        };

        match (self, event) {
            (_, TransportFailed) => Transition::closing(retry_search),

            (Phase::Searching, PortFound) => Transition::to(Phase::Validating),
            (Phase::Searching, PortMissing) => Transition::to(Phase::Searching),
            (Phase::Searching, Unclassified) => Transition::to(Phase::Backoff {
                resume: Resume::Searching,
            }),

            (Phase::Validating, BootHealthy) => Transition::to(Phase::Steady),
            (Phase::Validating, BootRejected) => Transition::closing(retry_search),
            // The link is still up, so the banner read is simply retried. A
            // board that already printed its banner is then rejected, which
            // closes the port; the next open resets the board and validation
            // starts over from a fresh banner.
            (Phase::Validating, Unclassified) => Transition::to(Phase::Backoff {
                resume: Resume::Validating,
            }),

            (Phase::Steady, CycleCompleted) => Transition::to(Phase::Steady),
            (Phase::Steady, Unclassified) => Transition::to(Phase::Backoff {
                resume: Resume::Steady,
            }),

            (Phase::Backoff { resume }, BackoffElapsed) => Transition::to(resume.into()),

            (phase, _) => Transition::to(phase),
        }
    }

    /// Whether the controller holds a connection in this phase.
    pub fn expects_connection(self) -> bool {
        matches!(
            self,
            Phase::Validating
                | Phase::Steady
                | Phase::Backoff {
                    resume: Resume::Validating | Resume::Steady
                }
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Searching => write!(f, "searching"),
            Phase::Validating => write!(f, "validating"),
            Phase::Steady => write!(f, "steady"),
            Phase::Backoff { resume } => write!(f, "backoff -> {:?}", resume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [Phase; 6] = [
        Phase::Searching,
        Phase::Validating,
        Phase::Steady,
        Phase::Backoff {
            resume: Resume::Searching,
        },
        Phase::Backoff {
            resume: Resume::Validating,
        },
        Phase::Backoff {
            resume: Resume::Steady,
        },
    ];

    #[test]
    fn test_happy_path() {
        let t = Phase::Searching.on(Event::PortFound);
        assert_eq!(t.next, Phase::Validating);
        assert!(!t.close_connection);

        let t = t.next.on(Event::BootHealthy);
        assert_eq!(t.next, Phase::Steady);

        let t = t.next.on(Event::CycleCompleted);
        assert_eq!(t, Transition::to(Phase::Steady));
    }

    #[test]
    fn test_not_found_stays_searching() {
        assert_eq!(
            Phase::Searching.on(Event::PortMissing),
            Transition::to(Phase::Searching)
        );
    }

    #[test]
    fn test_rejected_boot_closes_and_backs_off() {
        let t = Phase::Validating.on(Event::BootRejected);
        assert!(t.close_connection);
        assert_eq!(
            t.next,
            Phase::Backoff {
                resume: Resume::Searching
            }
        );
        assert_eq!(t.next.on(Event::BackoffElapsed).next, Phase::Searching);
    }

    #[test]
    fn test_transport_failure_from_anywhere() {
        for phase in ALL_PHASES {
            let t = phase.on(Event::TransportFailed);
            assert!(t.close_connection, "{} should close", phase);
            assert_eq!(
                t.next,
                Phase::Backoff {
                    resume: Resume::Searching
                }
            );
        }
    }

    #[test]
    fn test_unclassified_resumes_same_phase_without_closing() {
        for phase in [Phase::Searching, Phase::Validating, Phase::Steady] {
            let t = phase.on(Event::Unclassified);
            assert!(!t.close_connection);
            assert_eq!(t.next.on(Event::BackoffElapsed).next, phase);
        }
    }

    #[test]
    fn test_impossible_events_are_ignored() {
        assert_eq!(
            Phase::Steady.on(Event::PortFound),
            Transition::to(Phase::Steady)
        );
        assert_eq!(
            Phase::Searching.on(Event::BackoffElapsed),
            Transition::to(Phase::Searching)
        );
    }

    #[test]
    fn test_expects_connection() {
        assert!(!Phase::Searching.expects_connection());
        assert!(Phase::Validating.expects_connection());
        assert!(Phase::Steady.expects_connection());
        assert!(!Phase::Backoff {
            resume: Resume::Searching
        }
        .expects_connection());
        assert!(Phase::Backoff {
            resume: Resume::Steady
        }
        .expects_connection());
    }
}
