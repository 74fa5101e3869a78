//! Terminal feedback while a lookup or save is outstanding.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// Elapsed time is only shown once a request has been slow for this long.
const SHOW_ELAPSED_AFTER: Duration = Duration::from_secs(2);

/// A stderr spinner running on a background task until [`Spinner::stop`].
pub struct Spinner {
    handle: JoinHandle<()>,
    done: watch::Sender<bool>,
}

impl Spinner {
    pub fn start(label: &str) -> Self {
        let (done, mut done_rx) = watch::channel(false);
        let label = label.to_string();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                let line = status_line(frame, &label, started.elapsed());
                eprint!("\x1b[2K\r{line}");
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = done_rx.changed() => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self { handle, done }
    }

    /// Stop and clear the line.
    pub async fn stop(self) {
        let _ = self.done.send(true);
        let _ = self.handle.await;
    }
}

fn status_line(frame: &str, label: &str, elapsed: Duration) -> String {
    if elapsed < SHOW_ELAPSED_AFTER {
        format!("{frame} {label}")
    } else {
        format!("{frame} {label} ({}s)", elapsed.as_secs())
    }
}
