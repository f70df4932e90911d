//! Diagnostic trace sink.
//!
//! The client reports what it is about to send and what it received to an
//! injected [`Logger`]. The sink only receives finished strings; it cannot
//! influence the request. Clients start with [`Silent`], so the trace points
//! never need to ask whether a sink exists.

/// Receives pre-formatted trace messages.
pub trait Logger: Send + Sync {
    /// Records one message.
    fn log(&self, message: &str);

    /// Lets the caller skip formatting large messages for sinks that drop them.
    fn enabled(&self) -> bool {
        true
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Logger for Silent {
    fn log(&self, _message: &str) {}

    fn enabled(&self) -> bool {
        false
    }
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Forwards to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, message: &str) {
        log::debug!(target: "rawpost::trace", "{message}");
    }

    fn enabled(&self) -> bool {
        log::log_enabled!(target: "rawpost::trace", log::Level::Debug)
    }
}
