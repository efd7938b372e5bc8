use std::thread;

use crossbeam_channel::{unbounded, Sender};

use crate::pipeline::events::PipelineEvent;
use crate::recognition::recognizer::{
    RecognitionError, RecognitionMatch, RecognitionRequest, RecognitionResult, RecognitionService,
};

/// Synchronous recognition backend run on the worker thread.
pub type SearchFn =
    Box<dyn FnMut(&RecognitionRequest) -> Result<Vec<RecognitionMatch>, RecognitionError> + Send>;

/// Runs a blocking recognition backend on a dedicated thread.
///
/// The throttle in front of this service keeps the request volume low, so
/// a single worker is enough; crops are searched in dispatch order.
pub struct ThreadedRecognitionService {
    request_tx: Option<Sender<RecognitionRequest>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadedRecognitionService {
    pub fn spawn(mut search: SearchFn, events: Sender<PipelineEvent>) -> Self {
        let (request_tx, request_rx) = unbounded::<RecognitionRequest>();
        let worker = thread::spawn(move || {
            for request in request_rx {
                let outcome = search(&request);
                let result = RecognitionResult {
                    id: request.id,
                    outcome,
                };
                if events.send(PipelineEvent::Recognition(result)).is_err() {
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

impl RecognitionService for ThreadedRecognitionService {
    fn search(&mut self, request: RecognitionRequest) -> Result<(), RecognitionError> {
        match &self.request_tx {
            Some(tx) => tx.send(request).map_err(|_| RecognitionError::WorkerGone),
            None => Err(RecognitionError::WorkerGone),
        }
    }
}

impl Drop for ThreadedRecognitionService {
    fn drop(&mut self) {
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
