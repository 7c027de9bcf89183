use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use revsync::sync::SyncProgress;

#[derive(Default)]
struct ProgressState {
    bar: Option<ProgressBar>,
    /// Full syncs know their end point up front; incremental ones do not.
    full_sync: bool,
}

/// Interactive progress reporter using indicatif.
///
/// Shows a counter spinner while the number of new reviews is unknown and
/// switches to a bar once a full sync learns the total.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::Started {
                course_id, cutoff, ..
            } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::counter_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_prefix(format!("{:12}", "reviews"));
                if cutoff > 0 {
                    pb.set_message(format!("Fetching new reviews of {}...", course_id));
                } else {
                    pb.set_message(format!("Fetching all reviews of {}...", course_id));
                }
                state.full_sync = cutoff <= 0;
                state.bar = Some(pb);
            }

            SyncProgress::FetchingBatch { start } => {
                if let Some(ref pb) = state.bar {
                    pb.set_message(format!("Requesting offset {}...", start));
                }
            }

            SyncProgress::FetchedBatch {
                total,
                collected_so_far,
                ..
            } => {
                if let Some(ref pb) = state.bar {
                    if state.full_sync && pb.length().is_none() {
                        pb.disable_steady_tick();
                        pb.set_length(total);
                        pb.set_style(Self::bar_style());
                    }
                    pb.set_position(collected_so_far as u64);
                }
            }

            SyncProgress::Pacing { delay_ms } => {
                if let Some(ref pb) = state.bar {
                    pb.set_message(format!("Waiting {}ms", delay_ms));
                }
            }

            SyncProgress::CutoffReached { .. } => {
                if let Some(ref pb) = state.bar {
                    pb.set_message("Reached previously seen reviews");
                }
            }

            SyncProgress::Exhausted { total } => {
                if let Some(ref pb) = state.bar {
                    pb.set_message(format!("All {} reviews fetched", total));
                }
            }

            SyncProgress::Complete { collected, batches } => {
                if let Some(ref pb) = state.bar {
                    pb.finish_with_message(format!(
                        "{} new reviews in {} batch{}",
                        collected,
                        batches,
                        if batches == 1 { "" } else { "es" }
                    ));
                }
            }

            _ => {}
        }
    }

    /// Finish the bar, keeping it on screen.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref pb) = state.bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    /// Stop the bar after a failed run, leaving its last message.
    pub fn abandon(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref pb) = state.bar
            && !pb.is_finished()
        {
            pb.abandon();
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> Option<u64> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.bar.as_ref().map(ProgressBar::position)
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.bar.as_ref().is_some_and(ProgressBar::is_finished)
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>5} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
