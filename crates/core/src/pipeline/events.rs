use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::detection::domain::detector::DetectionResult;
use crate::recognition::recognizer::RecognitionResult;

/// Completion message from an asynchronous worker.
///
/// Workers never touch pipeline state directly; they post events here and
/// the pipeline folds them in on its own thread when it pumps the queue.
#[derive(Clone, Debug)]
pub enum PipelineEvent {
    Detection(DetectionResult),
    Recognition(RecognitionResult),
}

/// Unbounded event queue shared by the pipeline and its workers.
pub fn channel() -> (Sender<PipelineEvent>, Receiver<PipelineEvent>) {
    unbounded()
}
