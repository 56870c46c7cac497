//! Lifecycle shared by the services the registry owns.

use std::fmt;

use hearth_core::error::HearthResult;

/// Where a service is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Created,
    Initializing,
    Running,
    Stopped,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry-managed service. `init` runs in registration order and
/// `shutdown` in reverse.
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ServiceState;

    fn init(&mut self) -> HearthResult<()>;

    fn shutdown(&mut self) -> HearthResult<()>;

    /// Only a running service reports healthy.
    fn is_healthy(&self) -> bool {
        self.state() == ServiceState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chores {
        state: ServiceState,
    }

    impl Service for Chores {
        fn name(&self) -> &str {
            "chores"
        }

        fn state(&self) -> ServiceState {
            self.state
        }

        fn init(&mut self) -> HearthResult<()> {
            self.state = ServiceState::Running;
            Ok(())
        }

        fn shutdown(&mut self) -> HearthResult<()> {
            self.state = ServiceState::Stopped;
            Ok(())
        }
    }

    #[test]
    fn test_only_running_is_healthy() {
        let mut chores = Chores { state: ServiceState::Created };
        assert!(!chores.is_healthy());

        chores.init().unwrap();
        assert!(chores.is_healthy());

        chores.shutdown().unwrap();
        assert!(!chores.is_healthy());
        assert_eq!(chores.state().to_string(), "stopped");
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ServiceState::Initializing.as_str(), "initializing");
        assert_eq!(format!("{}", ServiceState::Created), "created");
    }
}
