use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use log::*;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use signal_hook::low_level::signal_name;

use crate::heating::StopHandle;

// Turns SIGINT/SIGTERM into a cooperative stop of the control loop. The
// process is never exited from here; the loop winds down on its own.
pub struct SignalWatcher {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatcher {
    pub fn install(stop: StopHandle) -> Result<SignalWatcher> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    let name = signal_name(signal).unwrap_or("signal");
                    if stop.is_running() {
                        info!("Received {}, stopping after the current cycle", name);
                        stop.stop();
                    } else {
                        info!("Received {}, already stopping", name);
                    }
                }
            })
            .context("Failed to start signal watcher")?;

        Ok(SignalWatcher {
            handle,
            thread: Some(thread),
        })
    }

    pub fn close(mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
