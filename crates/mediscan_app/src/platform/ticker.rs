use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mediscan_core::{Msg, RequestId, MAX_TICK_INCREMENT, TICK_INTERVAL_MS};
use mediscan_logging::mediscan_trace;
use rand::Rng;

/// Posts `SimulatedProgressTick` messages for one submission with random
/// increments until stopped.
///
/// Stopping is idempotent and also happens on drop, so no exit path can leave
/// the timer running.
pub struct ProgressTicker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start(request_id: RequestId, msg_tx: mpsc::Sender<Msg>) -> io::Result<Self> {
        Self::with_interval(request_id, msg_tx, Duration::from_millis(TICK_INTERVAL_MS))
    }

    pub fn with_interval(
        request_id: RequestId,
        msg_tx: mpsc::Sender<Msg>,
        interval: Duration,
    ) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let handle = thread::Builder::new()
            .name("mediscan-progress".to_string())
            .spawn(move || {
                let mut rng = rand::thread_rng();
                loop {
                    thread::park_timeout(interval);
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    let tick = Msg::SimulatedProgressTick {
                        request_id,
                        increment: rng.gen_range(0.0..MAX_TICK_INCREMENT),
                    };
                    if msg_tx.send(tick).is_err() {
                        break;
                    }
                }
                mediscan_trace!("Progress ticker stopped");
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
