//! Diagnostic log for recoverable plugin failures

use parking_lot::Mutex;

/// Logging collaborator invoked on every recoverable load failure
pub trait DiagnosticLog: Send + Sync {
    /// Record a message raised by `context` (the registry operation)
    fn write(&self, context: &str, message: &str);
}

/// Forwards to the `log` facade under the `plugins` target
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardLog;

impl DiagnosticLog for StandardLog {
    fn write(&self, context: &str, message: &str) {
        log::warn!(target: "plugins", "{}: {}", context, message);
    }
}

/// Single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub context: String,
    pub message: String,
}

/// Keeps entries in memory and also forwards them to the `log` facade
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticLog for MemoryLog {
    fn write(&self, context: &str, message: &str) {
        StandardLog.write(context, message);
        self.entries.lock().push(DiagnosticEntry {
            context: context.to_string(),
            message: message.to_string(),
        });
    }
}
