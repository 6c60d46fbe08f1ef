use std::collections::VecDeque;

/// Diagnostic categories, used to pick the log level and for display grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    LoadProgress,
    LoadComplete,
    LoadFailure,
    UnsupportedFormat,
    Capability,
    Permission,
    Device,
}

impl DiagnosticKind {
    fn level(self) -> log::Level {
        match self {
            DiagnosticKind::LoadProgress => log::Level::Debug,
            DiagnosticKind::LoadComplete => log::Level::Info,
            DiagnosticKind::UnsupportedFormat | DiagnosticKind::Permission => log::Level::Warn,
            DiagnosticKind::LoadFailure | DiagnosticKind::Capability | DiagnosticKind::Device => {
                log::Level::Error
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Human-readable diagnostics channel.
///
/// Every message is logged immediately and kept in a bounded ring so an
/// overlay can show the most recent ones. Nothing in the engine reads these
/// back to make decisions.
#[derive(Debug)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Diagnostics {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn emit(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        log::log!(kind.level(), "{message}");

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic { kind, message });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Take all buffered diagnostics, oldest first
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
