//! Progress reporting and cancellation for render passes.

/// Receives render progress. Returning `false` asks the pass to stop.
pub trait ProgressCallback {
    fn amount_complete(&mut self, done: u64, total: u64) -> bool;
}

impl<F: FnMut(u64, u64) -> bool> ProgressCallback for F {
    fn amount_complete(&mut self, done: u64, total: u64) -> bool {
        self(done, total)
    }
}

/// A callback that ignores progress and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn amount_complete(&mut self, _done: u64, _total: u64) -> bool {
        true
    }
}

/// Maps a child pass's progress into `[start, end]` of a parent's `total`.
///
/// Used when a layer hands part of its own work (typically the context render)
/// to a nested pass.
pub struct SubProgress<'a> {
    parent: &'a mut dyn ProgressCallback,
    start: u64,
    end: u64,
    total: u64,
}

impl<'a> SubProgress<'a> {
    pub fn new(parent: &'a mut dyn ProgressCallback, start: u64, end: u64, total: u64) -> Self {
        Self {
            parent,
            start,
            end,
            total,
        }
    }
}

impl ProgressCallback for SubProgress<'_> {
    fn amount_complete(&mut self, done: u64, total: u64) -> bool {
        if total == 0 {
            return self.parent.amount_complete(self.start, self.total);
        }
        let span = self.end.saturating_sub(self.start) as f64;
        let fraction = (done.min(total) as f64) / total as f64;
        let mapped = self.start + (span * fraction).round() as u64;
        self.parent.amount_complete(mapped, self.total)
    }
}
