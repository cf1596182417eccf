use std::path::Path;

use super::SkipRecord;

/// Observer for per-file ingestion outcomes.
///
/// Implementors can log, count, or surface skips to users. All callbacks
/// default to no-ops.
pub trait IngestObserver {
    /// Called when a file was parsed and folded into the unifier.
    fn on_source(&self, _path: &Path, _rows: usize) {}

    /// Called when a file was skipped (unsupported format or malformed).
    fn on_skip(&self, _record: &SkipRecord) {}
}

/// Observer that discards every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl IngestObserver for NullObserver {}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestObserver for StdErrObserver {
    fn on_source(&self, path: &Path, rows: usize) {
        eprintln!("[ingest][ok] path={} rows={rows}", path.display());
    }

    fn on_skip(&self, record: &SkipRecord) {
        eprintln!(
            "[ingest][skip] path={} reason={}",
            record.path.display(),
            record.reason
        );
    }
}
