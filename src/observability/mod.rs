//! Observability subsystem for pathdb
//!
//! Structured JSON logging and lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use pathdb::observability::{Logger, Event, ObservationScope};
//!
//! Logger::info("QUERY_COMPLETE", &[("rows", "42")]);
//!
//! let scope = ObservationScope::new("QUERY");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{LogTarget, Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event with fields.
///
/// Failure events go out at ERROR, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::StoreOpened);
        log_event_with_fields(Event::ViewDropped, &[("view", "pathdb_view_x")]);
    }
}
