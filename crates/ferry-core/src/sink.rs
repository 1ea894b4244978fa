//! Diagnostic output channel passed explicitly into every operation.
//!
//! Verbose runs stream collaborator chatter to stderr; quiet runs drop
//! it. The sink never influences control flow or results, and tests can
//! inject a capturing implementation.

pub trait Sink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Passthrough sink for verbose runs.
pub struct StderrSink;

impl Sink for StderrSink {
    fn emit(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Swallows everything.
pub struct DiscardSink;

impl Sink for DiscardSink {
    fn emit(&self, _line: &str) {}
}

/// Pick the sink for a verbosity flag, once per process.
pub fn select(verbose: bool) -> &'static dyn Sink {
    if verbose {
        &StderrSink
    } else {
        &DiscardSink
    }
}
