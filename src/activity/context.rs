//! Contexts handed to stage-based activities.
//!
//! They distinguish boot-time suspension/resumption from a runtime pause or a real
//! shutdown, so an activity can skip expensive work at boot.

/// Context for the `prepare` and `suspend` phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerSuspendContext {
    starting: bool,
    stopping: bool,
}

impl ServerSuspendContext {
    /// Runtime suspend (management operation): neither starting nor stopping.
    pub const fn runtime() -> Self {
        Self {
            starting: false,
            stopping: false,
        }
    }

    /// Suspension while the server boots (e.g. registration before boot completes).
    pub const fn starting() -> Self {
        Self {
            starting: true,
            stopping: false,
        }
    }

    /// Suspension that precedes a server stop.
    pub const fn stopping() -> Self {
        Self {
            starting: false,
            stopping: true,
        }
    }

    /// True if the server is still booting.
    #[inline]
    pub const fn is_starting(&self) -> bool {
        self.starting
    }

    /// True if the server is about to stop.
    #[inline]
    pub const fn is_stopping(&self) -> bool {
        self.stopping
    }
}

/// Context for the `resume` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerResumeContext {
    starting: bool,
}

impl ServerResumeContext {
    /// Resume after a runtime suspend.
    pub const fn runtime() -> Self {
        Self { starting: false }
    }

    /// The initial resume at the end of boot.
    pub const fn starting() -> Self {
        Self { starting: true }
    }

    /// True if this resume completes server boot.
    #[inline]
    pub const fn is_starting(&self) -> bool {
        self.starting
    }
}
