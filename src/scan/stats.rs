//! Lock-free counters describing scan loop activity.

use crate::preprocess::CandidateKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by the scan loop.
#[derive(Debug, Default)]
pub struct ScanStats {
    ticks: AtomicU64,
    skipped_ticks: AtomicU64,
    not_ready: AtomicU64,
    capture_failures: AtomicU64,
    misses: AtomicU64,
    hits_raw: AtomicU64,
    hits_enhanced: AtomicU64,
    hits_center_strip: AtomicU64,
    rejected: AtomicU64,
    delivered: AtomicU64,
    callback_panics: AtomicU64,
}

/// Point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Ticks that ran the pipeline.
    pub ticks: u64,
    /// Ticks dropped because the previous one was still running, plus timer
    /// firings missed by overrunning ticks.
    pub skipped_ticks: u64,
    /// Ticks that found the stream without a frame ready.
    pub not_ready: u64,
    /// Frame captures that failed.
    pub capture_failures: u64,
    /// Frames where no candidate decoded.
    pub misses: u64,
    /// Decodes on the raw frame.
    pub hits_raw: u64,
    /// Decodes on the enhanced frame.
    pub hits_enhanced: u64,
    /// Decodes on the centre strip.
    pub hits_center_strip: u64,
    /// Decodes dropped by the validator.
    pub rejected: u64,
    /// Detections handed to the consumer.
    pub delivered: u64,
    /// Consumer callbacks that panicked.
    pub callback_panics: u64,
}

impl StatsSnapshot {
    /// Total successful decodes across all candidates.
    pub fn hits(&self) -> u64 {
        self.hits_raw + self.hits_enhanced + self.hits_center_strip
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ScanStats {
    pub(crate) fn record_tick(&self) {
        bump(&self.ticks);
    }

    pub(crate) fn record_skipped(&self, count: u64) {
        self.skipped_ticks.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_not_ready(&self) {
        bump(&self.not_ready);
    }

    pub(crate) fn record_capture_failure(&self) {
        bump(&self.capture_failures);
    }

    pub(crate) fn record_miss(&self) {
        bump(&self.misses);
    }

    pub(crate) fn record_hit(&self, kind: Option<CandidateKind>) {
        match kind {
            Some(CandidateKind::Raw) | None => bump(&self.hits_raw),
            Some(CandidateKind::Enhanced) => bump(&self.hits_enhanced),
            Some(CandidateKind::CenterStrip) => bump(&self.hits_center_strip),
        }
    }

    pub(crate) fn record_rejected(&self) {
        bump(&self.rejected);
    }

    pub(crate) fn record_delivered(&self) {
        bump(&self.delivered);
    }

    pub(crate) fn record_callback_panic(&self) {
        bump(&self.callback_panics);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            ticks: load(&self.ticks),
            skipped_ticks: load(&self.skipped_ticks),
            not_ready: load(&self.not_ready),
            capture_failures: load(&self.capture_failures),
            misses: load(&self.misses),
            hits_raw: load(&self.hits_raw),
            hits_enhanced: load(&self.hits_enhanced),
            hits_center_strip: load(&self.hits_center_strip),
            rejected: load(&self.rejected),
            delivered: load(&self.delivered),
            callback_panics: load(&self.callback_panics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_by_candidate() {
        let stats = ScanStats::default();
        stats.record_hit(Some(CandidateKind::Raw));
        stats.record_hit(Some(CandidateKind::CenterStrip));
        stats.record_hit(Some(CandidateKind::CenterStrip));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits_raw, 1);
        assert_eq!(snapshot.hits_enhanced, 0);
        assert_eq!(snapshot.hits_center_strip, 2);
        assert_eq!(snapshot.hits(), 3);
    }

    #[test]
    fn test_skipped_accumulates() {
        let stats = ScanStats::default();
        stats.record_skipped(1);
        stats.record_skipped(3);
        assert_eq!(stats.snapshot().skipped_ticks, 4);
    }
}
