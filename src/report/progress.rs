// src/report/progress.rs
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cluster::{MatrixProgress, MergeEvent, MergeObserver};

impl MatrixProgress for ProgressBar {
    fn begin(&self, rows: usize) {
        self.reset();
        self.set_length(rows as u64);
        self.set_message("Calculating Distance Matrix, this may take a while");
    }

    fn rows_done(&self, rows: usize) {
        self.inc(rows as u64);
    }

    fn finish(&self) {
        self.set_message("Distance Matrix has been created");
        self.tick();
    }
}

/// Prints per-iteration progress the way an interactive run reports it:
/// a distance-matrix bar, "N clusters left", and the terminal summary.
pub struct ConsoleObserver {
    bar: ProgressBar,
    visible: bool,
}

impl ConsoleObserver {
    pub fn new(show_progress: bool) -> Self {
        let bar = if show_progress {
            let bar = ProgressBar::new(0);
            bar.set_style(ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% done | {elapsed_precise}\n{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar, visible: show_progress }
    }

    fn say(&self, line: &str) {
        if self.visible {
            self.bar.println(line);
        } else {
            println!("{}", line);
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl MergeObserver for ConsoleObserver {
    fn matrix_progress(&self) -> &dyn MatrixProgress {
        &self.bar
    }

    fn clusters_left(&mut self, count: usize) {
        debug!("{} clusters left", count);
        self.say(&format!("{} clusters left", count));
    }

    fn merged(&mut self, event: &MergeEvent) {
        if let Some(terminal) = &event.terminal {
            self.say(&format!("length of bigger cluster: {}", terminal.size));
            self.say(&format!("prototype of bigger cluster {}", terminal.prototype));
        }
    }
}
