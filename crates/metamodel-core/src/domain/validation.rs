use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::domain::identifier::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed or conflicting metadata found on one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ValidationFailure {
    pub identifier: Identifier,
    pub message: String,
    pub severity: Severity,
    /// Factory or validator that raised it.
    pub origin: String,
}

impl ValidationFailure {
    pub fn error(identifier: Identifier, message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            identifier,
            message: message.into(),
            severity: Severity::Error,
            origin: origin.into(),
        }
    }

    pub fn warning(
        identifier: Identifier,
        message: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            message: message.into(),
            severity: Severity::Warning,
            origin: origin.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.identifier, self.message)
    }
}

/// Loader-scoped, append-only failure log shared by every introspection.
///
/// Cloning shares the underlying log.
#[derive(Debug, Clone, Default)]
pub struct ValidationFailures {
    inner: Arc<Mutex<Vec<ValidationFailure>>>,
}

impl ValidationFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, failure: ValidationFailure) {
        // A poisoned log still holds every failure pushed before the panic.
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.push(failure);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map_or_else(|p| p.into_inner().len(), |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.clear();
    }

    /// Sorted, de-duplicated copy of the log.
    pub fn snapshot(&self) -> Vec<ValidationFailure> {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut failures = inner.clone();
        failures.sort();
        failures.dedup();
        failures
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport::new(self.snapshot())
    }
}

/// Aggregate outcome of a metamodel build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn new(mut failures: Vec<ValidationFailure>) -> Self {
        failures.sort();
        failures.dedup();
        Self { failures }
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| !f.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures whose identifier belongs to `class_name`.
    pub fn for_class<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a ValidationFailure> {
        self.failures
            .iter()
            .filter(move |f| f.identifier.class_name() == class_name)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn failures_are_shared_between_clones() {
        let failures = ValidationFailures::new();
        let other = failures.clone();
        other.add(ValidationFailure::error(Identifier::class("A"), "bad", "test"));
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn concurrent_writers_lose_nothing() {
        let failures = ValidationFailures::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let failures = failures.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        failures.add(ValidationFailure::warning(
                            Identifier::member(format!("C{i}"), format!("m{j}")),
                            "w",
                            "test",
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(failures.len(), 400);
    }

    #[test]
    fn snapshot_is_sorted_and_deduplicated() {
        let failures = ValidationFailures::new();
        failures.add(ValidationFailure::error(Identifier::class("B"), "x", "t"));
        failures.add(ValidationFailure::error(Identifier::class("A"), "x", "t"));
        failures.add(ValidationFailure::error(Identifier::class("A"), "x", "t"));

        let snapshot = failures.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].identifier.class_name(), "A");
    }

    #[test]
    fn report_splits_by_severity() {
        let report = ValidationReport::new(vec![
            ValidationFailure::error(Identifier::class("A"), "broken", "t"),
            ValidationFailure::warning(Identifier::member("A", "x"), "odd", "t"),
            ValidationFailure::warning(Identifier::class("B"), "odd", "t"),
        ]);
        assert!(report.has_errors());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert_eq!(report.for_class("A").count(), 2);
        assert!(!ValidationReport::default().has_errors());
    }
}
