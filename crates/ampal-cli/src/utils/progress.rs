use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// A progress bar over a batch of files, drawn on stderr.
#[derive(Clone)]
pub struct BatchProgress {
    pb: Arc<Mutex<ProgressBar>>,
}

impl BatchProgress {
    /// Creates a bar for `total` items. A hidden bar is used when `quiet` is set.
    pub fn new(total: u64, quiet: bool) -> Self {
        let pb = ProgressBar::new(total).with_style(Self::bar_style());
        if quiet {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            pb.set_draw_target(ProgressDrawTarget::stderr());
        }
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    /// Marks the start of an item.
    pub fn start(&self, name: &str) {
        self.with_bar(|pb| pb.set_message(name.to_string()));
    }

    /// Marks the current item as done.
    pub fn advance(&self) {
        self.with_bar(|pb| pb.inc(1));
    }

    /// Prints a line above the bar without breaking it.
    pub fn println(&self, msg: &str) {
        self.with_bar(|pb| pb.println(format!("  {}", msg)));
    }

    pub fn finish(&self, msg: &str) {
        self.with_bar(|pb| pb.finish_with_message(msg.to_string()));
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(pb_guard) = self.pb.lock() else {
            warn!("Progress bar mutex was poisoned. Cannot update progress.");
            return;
        };
        f(&pb_guard);
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            })
            .progress_chars("##-")
    }
}
