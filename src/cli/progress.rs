//! CLI progress callback

use crate::cli::style::{Stylize, check, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use escargo::submit::{Phase, ProgressCallback};
use escargo::types::{MergeReadiness, MergeRequest};
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress callback that prints to stdout
///
/// Shows a spinner on stderr while waiting for merge readiness.
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a progress printer
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message("Waiting for merge request to become mergeable...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(spinner) = slot.take()
        {
            spinner.finish_and_clear();
        }
    }

    fn spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Start => {}
            Phase::Aborted => println!("{} {phase}", "-".muted()),
            Phase::Approved => {
                println!("{} {phase}", check());
                self.start_spinner();
            }
            Phase::MergeReady => {
                self.stop_spinner();
                println!("{} {phase}", check());
            }
            _ => println!("{} {phase}", check()),
        }
    }

    async fn on_merge_request(&self, mr: &MergeRequest) {
        println!("  {} !{}", "Merge request".muted(), mr.iid);
        println!("    {}", mr.web_url.accent());
    }

    async fn on_merge_status(&self, attempt: u32, readiness: &MergeReadiness) {
        if readiness.is_ready() {
            return;
        }
        let line = format!(
            "warning: MergeStatus is: {readiness}, retrying ... (check {attempt})"
        );
        match self.spinner() {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line.warn())),
            None => eprintln!("{}", line.warn()),
        }
    }

    async fn on_message(&self, message: &str) {
        println!("{message}");
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
