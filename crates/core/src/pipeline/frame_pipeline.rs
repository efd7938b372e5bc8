use std::time::Instant;

use crossbeam_channel::Receiver;
use log::{debug, warn};
use nalgebra::{Point2, Vector3};

use crate::detection::domain::detector::{
    DetectionRequest, DetectionResult, DetectorService,
};
use crate::detection::domain::observation::{DetectorKind, JointName, Observation};
use crate::detection::domain::slot::{Attachments, DetectorSlot};
use crate::localization::localizer::Localizer;
use crate::localization::unprojector::Unprojector;
use crate::pipeline::annotations::FrameAnnotations;
use crate::pipeline::events::PipelineEvent;
use crate::recognition::label_cache::LabelCache;
use crate::recognition::recognizer::{FaceRegion, RecognitionService};
use crate::recognition::throttle::{RecognitionConfig, RecognitionThrottle};
use crate::shared::constants::FACE_CROP_EXPANSION;
use crate::shared::frame::{ColorImage, Frame};
use crate::shared::viewport::{
    detector_point_to_viewport, detector_rect_to_viewport, NormalizedRect, ViewportRect,
    ViewportSize,
};
use crate::shared::RequestId;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub viewport: ViewportSize,
    pub recognition: RecognitionConfig,
    /// The joint whose world position the overlay marks.
    pub tracked_joint: JointName,
}

impl PipelineConfig {
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            viewport,
            recognition: RecognitionConfig::default(),
            tracked_joint: JointName::RightWrist,
        }
    }
}

/// The asynchronous collaborators the pipeline drives.
pub struct PipelineServices {
    pub face_detector: Box<dyn DetectorService>,
    pub body_detector: Box<dyn DetectorService>,
    pub recognizer: Box<dyn RecognitionService>,
    pub unprojector: Box<dyn Unprojector>,
}

/// Per-frame orchestrator.
///
/// Owns all mutable annotation state and runs on a single thread; workers
/// reach it only through the event channel, which [`FramePipeline::pump`]
/// drains at the top of every frame. Each detector kind has its own
/// single-in-flight slot, so a slow detector drops frames for itself
/// without stalling the other or the render loop.
pub struct FramePipeline {
    config: PipelineConfig,
    face_detector: Box<dyn DetectorService>,
    body_detector: Box<dyn DetectorService>,
    recognizer: Box<dyn RecognitionService>,
    localizer: Localizer,
    face_slot: DetectorSlot,
    body_slot: DetectorSlot,
    throttle: RecognitionThrottle,
    labels: LabelCache,
    events: Receiver<PipelineEvent>,
    next_request_id: RequestId,
    face_boxes: Vec<ViewportRect>,
    joints: Vec<(JointName, Point2<f32>)>,
    marker: Option<Vector3<f32>>,
}

impl FramePipeline {
    pub fn new(
        config: PipelineConfig,
        services: PipelineServices,
        events: Receiver<PipelineEvent>,
    ) -> Self {
        let throttle = RecognitionThrottle::new(config.recognition.clone());
        Self {
            config,
            face_detector: services.face_detector,
            body_detector: services.body_detector,
            recognizer: services.recognizer,
            localizer: Localizer::new(services.unprojector),
            face_slot: DetectorSlot::new(),
            body_slot: DetectorSlot::new(),
            throttle,
            labels: LabelCache::new(),
            events,
            next_request_id: 0,
            face_boxes: Vec::new(),
            joints: Vec::new(),
            marker: None,
        }
    }

    /// Processes one camera frame and returns what to draw over it.
    ///
    /// Completions already queued by the workers are folded in first, so a
    /// detector that finished since the last frame frees its slot before
    /// this frame asks for it.
    pub fn on_frame(&mut self, frame: &Frame, now: Instant) -> FrameAnnotations {
        self.pump(now);
        self.submit(DetectorKind::Face, frame);
        self.submit(DetectorKind::BodyPose, frame);
        self.annotations()
    }

    /// Drains queued worker completions without submitting a frame. Safe
    /// to call any time from the pipeline's thread.
    pub fn pump(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PipelineEvent::Detection(result) => match result.kind {
                    DetectorKind::Face => self.apply_face_result(result, now),
                    DetectorKind::BodyPose => self.apply_body_result(result),
                },
                PipelineEvent::Recognition(result) => {
                    self.throttle.on_result(result, &mut self.labels);
                }
            }
        }
    }

    /// Current overlay state.
    pub fn annotations(&self) -> FrameAnnotations {
        FrameAnnotations {
            face_boxes: self.face_boxes.clone(),
            joints: self.joints.clone(),
            labels: self.labels.visible(),
            marker: self.marker,
        }
    }

    fn submit(&mut self, kind: DetectorKind, frame: &Frame) {
        let (slot, service) = match kind {
            DetectorKind::Face => (&mut self.face_slot, &mut self.face_detector),
            DetectorKind::BodyPose => (&mut self.body_slot, &mut self.body_detector),
        };
        // Dropped frames must stay cheap, so nothing is copied before the
        // admission check.
        if !slot.is_idle() {
            debug!("{kind:?} busy, dropping frame at {:?}", frame.timestamp);
            return;
        }

        // Only what the result handler will need survives the submission.
        let attachments = match kind {
            DetectorKind::Face => Attachments {
                image: Some(frame.color.clone()),
                depth: None,
                display_transform: frame.display_transform,
                pose: frame.pose,
            },
            DetectorKind::BodyPose => Attachments {
                image: None,
                depth: frame.depth.clone(),
                display_transform: frame.display_transform,
                pose: frame.pose,
            },
        };
        let id = self.next_request_id;
        self.next_request_id += 1;
        slot.begin(id, attachments);
        let request = DetectionRequest {
            id,
            kind,
            image: frame.color.clone(),
        };
        if let Err(err) = service.submit(request) {
            warn!("{kind:?} submission failed: {err}");
            slot.reset();
        }
    }

    fn apply_face_result(&mut self, result: DetectionResult, now: Instant) {
        let Some(attachments) = self.face_slot.complete(result.id) else {
            debug!("stale face result {} ignored", result.id);
            return;
        };
        self.face_boxes.clear();
        let observations = match result.outcome {
            Ok(observations) => observations,
            Err(err) => {
                warn!("face detection failed: {err}");
                self.labels.hide_all();
                return;
            }
        };

        let mut regions = Vec::new();
        for observation in &observations {
            if let Observation::Face { bounds, .. } = observation {
                let viewport_box = detector_rect_to_viewport(
                    bounds,
                    &attachments.display_transform,
                    self.config.viewport,
                );
                self.face_boxes.push(viewport_box);
                if let Some(crop) = extract_face_crop(&attachments, bounds) {
                    regions.push(FaceRegion {
                        bounds: viewport_box,
                        crop,
                    });
                }
            }
        }

        if self.face_boxes.is_empty() {
            // Nobody in view; stale labels would float over nothing.
            self.labels.hide_all();
            return;
        }
        self.throttle
            .try_dispatch(regions, now, self.recognizer.as_mut(), &mut self.labels);
    }

    fn apply_body_result(&mut self, result: DetectionResult) {
        let Some(attachments) = self.body_slot.complete(result.id) else {
            debug!("stale body result {} ignored", result.id);
            return;
        };
        self.joints.clear();
        self.marker = None;
        let observations = match result.outcome {
            Ok(observations) => observations,
            Err(err) => {
                warn!("body detection failed: {err}");
                return;
            }
        };

        for observation in observations {
            if let Observation::Joint {
                name,
                location,
                confidence,
            } = observation
            {
                if confidence <= 0.0 {
                    continue;
                }
                let viewport_point = detector_point_to_viewport(
                    location,
                    &attachments.display_transform,
                    self.config.viewport,
                );
                self.joints.push((name, viewport_point));
                if name == self.config.tracked_joint {
                    self.marker = self.localizer.localize(
                        viewport_point,
                        location,
                        &attachments,
                        self.config.viewport,
                    );
                }
            }
        }
    }
}

/// Cuts the expanded face rectangle out of the frame that produced the
/// detection.
///
/// The detection box is normalized with a bottom-left origin while pixels
/// have a top-left origin, so the vertical edge flips during conversion.
/// The box then grows by the configured fraction about its center; the
/// crop itself clamps to the image.
fn extract_face_crop(attachments: &Attachments, bounds: &NormalizedRect) -> Option<ColorImage> {
    let image = attachments.image.as_ref()?;
    let (image_w, image_h) = (image.width() as f32, image.height() as f32);

    let mut x = bounds.min.x * image_w;
    let mut y = (1.0 - bounds.max.y) * image_h;
    let mut w = bounds.width() * image_w;
    let mut h = bounds.height() * image_h;

    x -= w * FACE_CROP_EXPANSION * 0.5;
    y -= h * FACE_CROP_EXPANSION * 0.5;
    w *= 1.0 + FACE_CROP_EXPANSION;
    h *= 1.0 + FACE_CROP_EXPANSION;

    image.crop(
        x.round() as i64,
        y.round() as i64,
        w.round() as i64,
        h.round() as i64,
    )
}
