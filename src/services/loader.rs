use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::model::Resource;
use crate::services::WrapSource;
use crate::ui::LoadMsg;

pub(crate) const WORKER_LOST: &str = "resource fetch ended without a result";

// Posts exactly one `LoadMsg::Resources` for its wrap: the real outcome via
// `settle`, or a failure from `Drop` if the worker unwinds first. The tree's
// in-flight marker is only cleared when that message is applied.
struct SettleGuard {
    wrap: String,
    tx: Sender<LoadMsg>,
    settled: bool,
}

impl SettleGuard {
    fn new(wrap: String, tx: Sender<LoadMsg>) -> Self {
        Self {
            wrap,
            tx,
            settled: false,
        }
    }

    fn settle(mut self, outcome: Result<Vec<Resource>, String>) {
        self.settled = true;
        self.post(outcome);
    }

    fn post(&self, outcome: Result<Vec<Resource>, String>) {
        // Receiver gone means the UI already exited.
        let _ = self.tx.send(LoadMsg::Resources {
            wrap: self.wrap.clone(),
            outcome,
        });
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.post(Err(WORKER_LOST.to_string()));
        }
    }
}

pub fn spawn_load_resources(source: Arc<dyn WrapSource>, wrap: String, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let guard = SettleGuard::new(wrap, tx);
        let outcome = source
            .fetch_resources(&guard.wrap)
            .map_err(|e| e.to_string());
        guard.settle(outcome);
    });
}
