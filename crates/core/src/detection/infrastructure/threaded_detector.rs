use std::thread;

use crossbeam_channel::{unbounded, Sender};

use crate::detection::domain::detector::{
    DetectionRequest, DetectionResult, DetectorError, DetectorService,
};
use crate::detection::domain::observation::Observation;
use crate::pipeline::events::PipelineEvent;
use crate::shared::frame::ColorImage;

/// Synchronous detector backend run on the worker thread.
pub type DetectFn = Box<dyn FnMut(&ColorImage) -> Result<Vec<Observation>, DetectorError> + Send>;

/// Runs an opaque detector backend on a dedicated thread.
///
/// Requests go in over a channel and completions come back as pipeline
/// events, exactly one per accepted request. The single-in-flight gate
/// lives in the pipeline's detector slot, not here; the worker simply
/// processes whatever it is handed in order.
pub struct ThreadedDetectorService {
    request_tx: Option<Sender<DetectionRequest>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadedDetectorService {
    pub fn spawn(mut detect: DetectFn, events: Sender<PipelineEvent>) -> Self {
        let (request_tx, request_rx) = unbounded::<DetectionRequest>();
        let worker = thread::spawn(move || {
            for request in request_rx {
                let outcome = detect(&request.image);
                let result = DetectionResult {
                    id: request.id,
                    kind: request.kind,
                    outcome,
                };
                if events.send(PipelineEvent::Detection(result)).is_err() {
                    break; // pipeline dropped its receiver
                }
            }
        });
        Self {
            request_tx: Some(request_tx),
            worker: Some(worker),
        }
    }
}

impl DetectorService for ThreadedDetectorService {
    fn submit(&mut self, request: DetectionRequest) -> Result<(), DetectorError> {
        match &self.request_tx {
            Some(tx) => tx.send(request).map_err(|_| DetectorError::WorkerGone),
            None => Err(DetectorError::WorkerGone),
        }
    }
}

impl Drop for ThreadedDetectorService {
    fn drop(&mut self) {
        // Closing the request channel lets the worker drain and exit.
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
