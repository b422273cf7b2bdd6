use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts input lines; when visible, redraws `label: n` on stderr every
/// `interval` lines.
pub struct ProgressCounter {
    label: &'static str,
    interval: u64,
    visible: bool,
    count: AtomicU64,
}

impl ProgressCounter {
    pub fn new(label: &'static str, interval: u64, visible: bool) -> Self {
        let counter = Self {
            label,
            interval: interval.max(1),
            visible,
            count: AtomicU64::new(0),
        };
        counter.print(0);
        counter
    }

    pub fn inc(&self, delta: u64) {
        let prev = self.count.fetch_add(delta, Ordering::Relaxed);
        let current = prev + delta;
        if prev / self.interval < current / self.interval {
            self.print(current);
        }
    }

    pub fn total(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn finish(&self) {
        if self.visible {
            self.print(self.total());
            eprintln!();
        }
    }

    fn print(&self, current: u64) {
        if !self.visible {
            return;
        }
        eprint!("\r{}: {}", self.label, current);
        let _ = std::io::stderr().flush();
    }
}
