//! ObservationScope for begin/complete logging around a unit of work
//!
//! - Logs `{name}_BEGIN` on creation (TRACE)
//! - Logs `{name}_COMPLETE` with `elapsed_ms` on `complete()` (INFO)
//! - Logs `{name}_FAILED` with a reason on `fail()` (ERROR)
//! - Logs `{name}_INCOMPLETE` if dropped without either (WARN)

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Creates a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::trace(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    /// Marks the scope complete, adding `extra_fields` to the line
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();

        let mut fields = self.field_refs();
        fields.extend(extra_fields.iter().copied());
        fields.push(("elapsed_ms", &elapsed));

        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn fail(self, reason: &str) {
        self.completed.set(true);

        let mut fields = self.field_refs();
        fields.push(("reason", reason));

        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for `elapsed_ms` fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lifecycle() {
        let scope = ObservationScope::with_fields("TEST", &[("view", "v")]);
        assert!(!scope.is_completed());
        scope.complete_with_fields(&[("rows", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 5);
    }
}
