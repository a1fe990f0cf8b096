//! Terminal progress bars for install stages.

use std::sync::Mutex;

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use packfetch::installer::{InstallObserver, InstallStage};

const BAR_TEMPLATE: &str = "{prefix:>24} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";
const SPINNER_TEMPLATE: &str = "{prefix:>24} {spinner} {wide_msg}";

/// Draws one progress bar per stage on stderr.
pub struct ProgressReporter {
    current: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            current: Mutex::new(None),
            quiet,
        }
    }

    fn bar_for(&self, stage: InstallStage, total: usize) -> ProgressBar {
        let bar = if total == 0 {
            let bar = ProgressBar::new_spinner();
            if let Ok(s) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                bar.set_style(s);
            }
            bar
        } else {
            let bar = ProgressBar::new(total as u64);
            if let Ok(s) = ProgressStyle::with_template(BAR_TEMPLATE) {
                bar.set_style(s.progress_chars("=> "));
            }
            bar
        };
        if self.quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_prefix(stage.name());
        bar
    }
}

impl InstallObserver for ProgressReporter {
    fn stage_started(&self, stage: InstallStage, total: usize) {
        let bar = self.bar_for(stage, total);
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(bar) {
                previous.finish();
            }
        }
    }

    fn item_finished(&self, _stage: InstallStage, done: usize, _total: usize, label: &str) {
        if let Ok(current) = self.current.lock() {
            if let Some(bar) = current.as_ref() {
                bar.set_position(done as u64);
                bar.set_message(label.to_string());
            }
        }
    }

    fn stage_finished(&self, _stage: InstallStage) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                bar.finish_with_message(style("done").green().to_string());
            }
        }
    }
}
