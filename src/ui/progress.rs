use crate::model::{JobProgress, JobState};
use crate::output::is_quiet;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a one-shot call is outstanding
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = if is_quiet() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        pb.set_message(message.to_string());
        if console::Term::stderr().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

/// Draw a one-off progress bar for an active ingestion job and leave it on screen
pub fn show_job_progress(state: JobState, progress: Option<&JobProgress>) {
    if is_quiet() || !state.is_active() {
        return;
    }

    let pb = match progress {
        Some(p) if p.total > 0 => {
            let pb = ProgressBar::new(p.total);
            let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb.set_position(p.processed.min(p.total));
            pb
        }
        _ => ProgressBar::new_spinner(),
    };
    pb.abandon_with_message(state.to_string());
}
