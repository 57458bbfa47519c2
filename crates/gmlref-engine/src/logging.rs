//! Operation tracing for refactoring runs
//!
//! Opt-in file trace of what the engine decided at each phase of a run:
//! what a request planned, which files the applier touched, what the
//! runtime was asked to patch. Each line carries the phase that emitted
//! it, so one trace file interleaves cleanly across batch runs. With no
//! trace attached every helper is a no-op. Failures never travel through
//! the trace; they stay in typed errors and status fields.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Engine phase a trace line was emitted from
#[derive(Debug, Clone, Copy)]
pub enum Phase {
    /// Rename planning (single or batch)
    Plan,
    /// Workspace edit application
    Apply,
    /// Hot-reload compatibility validation
    HotReload,
    /// Transpiler patch generation
    Patch,
}

impl Phase {
    fn tag(self) -> &'static str {
        match self {
            Phase::Plan => "plan",
            Phase::Apply => "apply",
            Phase::HotReload => "hot-reload",
            Phase::Patch => "patch",
        }
    }
}

/// Trace attached for the whole process; engines share it
static TRACE: Mutex<Option<OperationTrace>> = Mutex::new(None);

struct OperationTrace {
    file: File,
}

impl OperationTrace {
    fn record(&mut self, phase: Phase, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {:<10} {}", timestamp, phase.tag(), message);
        let _ = self.file.flush();
    }
}

/// Attach a trace file; subsequent engine runs append to it
pub fn attach(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if let Ok(mut guard) = TRACE.lock() {
        *guard = Some(OperationTrace { file });
    }
    Ok(())
}

/// Detach the trace; subsequent runs are untraced
pub fn detach() {
    if let Ok(mut guard) = TRACE.lock() {
        *guard = None;
    }
}

/// Record one phase line; a no-op when no trace is attached
pub(crate) fn trace(phase: Phase, message: &str) {
    if let Ok(mut guard) = TRACE.lock() {
        if let Some(ref mut active) = *guard {
            active.record(phase, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_lines_carry_phase_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        attach(&path).unwrap();
        trace(Phase::Plan, "scr_old -> scr_new: 2 occurrence(s)");
        trace(Phase::Apply, "2 file(s), 0 failed");
        detach();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("plan"));
        assert!(lines[0].contains("scr_old -> scr_new"));
        assert!(lines[1].contains("apply"));

        // Detached: tracing is a no-op and the file is left alone
        trace(Phase::Patch, "dropped");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }
}
