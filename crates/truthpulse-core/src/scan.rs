//! Simulated media scan.
//!
//! Runs as a cancellable repeating task: every tick the progress advances by
//! a random step until it reaches 100, then a random result is produced.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{ScanResult, Verdict};

/// Scores at or above this are labelled `Real`.
pub const REAL_THRESHOLD: u8 = 50;

const REAL_EXPLANATIONS: [&str; 3] = [
    "Stable lighting and consistent shadows.",
    "Natural skin texture and edge continuity.",
    "No temporal inconsistencies between frames.",
];

const FAKE_EXPLANATIONS: [&str; 3] = [
    "Blending seams detected around the face boundary.",
    "Lighting direction changes between frames.",
    "Unnatural smoothing in high-frequency skin detail.",
];

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Interval between progress updates.
    pub tick: Duration,
    /// Smallest progress step per tick (at least 1).
    pub min_step: u8,
    /// Largest progress step per tick.
    pub max_step: u8,
    /// Fixed RNG seed for reproducible scans.
    pub seed: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(120),
            min_step: 3,
            max_step: 12,
            seed: None,
        }
    }
}

/// A running scan.
pub struct ScanHandle {
    progress: watch::Receiver<u8>,
    task: JoinHandle<ScanResult>,
}

impl ScanHandle {
    /// Subscribe to progress updates (0–100).
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Wait for the result; `None` if the scan was cancelled.
    pub async fn finish(self) -> Option<ScanResult> {
        match self.task.await {
            Ok(result) => Some(result),
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!("scan task failed: {e}");
                }
                None
            }
        }
    }
}

/// Start a simulated scan on the current tokio runtime.
pub fn start_scan(config: ScanConfig) -> ScanHandle {
    let (tx, rx) = watch::channel(0u8);
    let task = tokio::spawn(run_scan(config, tx));
    ScanHandle { progress: rx, task }
}

async fn run_scan(config: ScanConfig, progress: watch::Sender<u8>) -> ScanResult {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let min_step = config.min_step.max(1);
    let max_step = config.max_step.max(min_step);

    let mut interval = tokio::time::interval(config.tick);
    let mut percent = 0u8;
    while percent < 100 {
        interval.tick().await;
        let step = rng.gen_range(min_step..=max_step);
        percent = percent.saturating_add(step).min(100);
        // Nobody listening is fine; the result is still delivered.
        let _ = progress.send(percent);
    }

    random_result(&mut rng)
}

fn random_result(rng: &mut impl Rng) -> ScanResult {
    let score: u8 = rng.gen_range(0..=100);
    let (label, pool) = if score >= REAL_THRESHOLD {
        (Verdict::Real, &REAL_EXPLANATIONS)
    } else {
        (Verdict::Fake, &FAKE_EXPLANATIONS)
    };
    let explanation = pool[rng.gen_range(0..pool.len())].to_string();
    ScanResult {
        score,
        label,
        explanation,
    }
}
