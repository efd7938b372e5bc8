use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::info;
use nalgebra::{Affine2, Point2, Vector3};

use framemark_core::detection::domain::observation::{JointName, Observation};
use framemark_core::detection::infrastructure::threaded_detector::ThreadedDetectorService;
use framemark_core::localization::unprojector::PinholeUnprojector;
use framemark_core::pipeline::events;
use framemark_core::pipeline::frame_pipeline::{FramePipeline, PipelineConfig, PipelineServices};
use framemark_core::recognition::infrastructure::http_recognizer::HttpRecognizer;
use framemark_core::recognition::infrastructure::threaded_recognizer::{
    SearchFn, ThreadedRecognitionService,
};
use framemark_core::recognition::recognizer::RecognitionMatch;
use framemark_core::shared::frame::{CameraPose, ColorImage, DepthMap, Frame};
use framemark_core::shared::viewport::{NormalizedRect, ViewportSize};

/// Runs the annotation pipeline against a synthetic camera feed and logs
/// the overlay it would draw.
#[derive(Parser)]
#[command(name = "framemark")]
struct Cli {
    /// Number of synthetic frames to feed the pipeline.
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Viewport width in display pixels.
    #[arg(long, default_value = "390.0")]
    viewport_width: f32,

    /// Viewport height in display pixels.
    #[arg(long, default_value = "844.0")]
    viewport_height: f32,

    /// Milliseconds between synthetic frames.
    #[arg(long, default_value = "33")]
    frame_interval_ms: u64,

    /// Simulated latency of each detector call.
    #[arg(long, default_value = "50")]
    detector_latency_ms: u64,

    /// Identity search endpoint; without one a canned offline matcher is
    /// used.
    #[arg(long)]
    recognition_endpoint: Option<String>,

    /// Identity collection to search.
    #[arg(long, default_value = "faces")]
    collection_id: String,
}

const IMAGE_SIZE: u32 = 64;
const DEPTH_SIZE: usize = 32;

fn synthetic_frame(tick: u32) -> Frame {
    let mut pixels = Vec::with_capacity((IMAGE_SIZE * IMAGE_SIZE * 3) as usize);
    for row in 0..IMAGE_SIZE {
        for col in 0..IMAGE_SIZE {
            pixels.push((row * 4) as u8);
            pixels.push((col * 4) as u8);
            pixels.push((tick % 256) as u8);
        }
    }
    let mut depth = Vec::with_capacity(DEPTH_SIZE * DEPTH_SIZE);
    for row in 0..DEPTH_SIZE {
        for _col in 0..DEPTH_SIZE {
            depth.push(1.0 + row as f32 * 0.05);
        }
    }
    Frame {
        color: ColorImage::new(pixels, IMAGE_SIZE, IMAGE_SIZE, 3),
        depth: Some(DepthMap::new(depth, DEPTH_SIZE, DEPTH_SIZE)),
        pose: CameraPose {
            position: Vector3::zeros(),
            forward: Vector3::z(),
            up: Vector3::y(),
        },
        display_transform: Affine2::identity(),
        timestamp: Duration::from_millis(tick as u64 * 33),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let (events_tx, events_rx) = events::channel();

    // Synthetic detectors: a face box drifting left and right, and a wrist
    // sweeping across the frame. Each sleeps to mimic a real model.
    let latency = Duration::from_millis(cli.detector_latency_ms);
    let mut face_tick = 0u32;
    let face_detector = ThreadedDetectorService::spawn(
        Box::new(move |_image| {
            thread::sleep(latency);
            face_tick += 1;
            let sway = (face_tick as f32 * 0.2).sin() * 0.1;
            Ok(vec![Observation::Face {
                bounds: NormalizedRect::new(0.35 + sway, 0.5, 0.25, 0.2),
                confidence: 0.97,
            }])
        }),
        events_tx.clone(),
    );
    let mut body_tick = 0u32;
    let body_detector = ThreadedDetectorService::spawn(
        Box::new(move |_image| {
            thread::sleep(latency);
            body_tick += 1;
            let sweep = 0.2 + (body_tick as f32 * 0.1).sin().abs() * 0.6;
            Ok(vec![Observation::Joint {
                name: JointName::RightWrist,
                location: Point2::new(sweep, 0.4),
                confidence: 0.85,
            }])
        }),
        events_tx.clone(),
    );

    let search: SearchFn = match &cli.recognition_endpoint {
        Some(endpoint) => HttpRecognizer::new(endpoint.clone()).into_search_fn(),
        None => Box::new(|_request| {
            Ok(vec![RecognitionMatch {
                identity: "demo-subject".to_string(),
                similarity: 95.0,
            }])
        }),
    };
    let recognizer = ThreadedRecognitionService::spawn(search, events_tx);

    let mut config = PipelineConfig::new(ViewportSize::new(
        cli.viewport_width,
        cli.viewport_height,
    ));
    config.recognition.collection_id = cli.collection_id.clone();

    let mut pipeline = FramePipeline::new(
        config,
        PipelineServices {
            face_detector: Box::new(face_detector),
            body_detector: Box::new(body_detector),
            recognizer: Box::new(recognizer),
            unprojector: Box::new(PinholeUnprojector::default()),
        },
        events_rx,
    );

    info!("feeding {} synthetic frames", cli.frames);
    for tick in 0..cli.frames {
        let frame = synthetic_frame(tick);
        let annotations = pipeline.on_frame(&frame, Instant::now());
        info!(
            "frame {tick}: {} face box(es), {} joint(s), {} label(s), marker {:?}",
            annotations.face_boxes.len(),
            annotations.joints.len(),
            annotations.labels.len(),
            annotations.marker,
        );
        for label in &annotations.labels {
            info!(
                "  label '{}' at ({:.0}, {:.0})",
                label.text,
                label.anchor.center().x,
                label.anchor.center().y
            );
        }
        thread::sleep(Duration::from_millis(cli.frame_interval_ms));
    }

    // Let in-flight work finish before reporting the final overlay.
    thread::sleep(latency * 2);
    pipeline.pump(Instant::now());
    let last = pipeline.annotations();
    info!(
        "final overlay: {} face box(es), {} label(s), marker {:?}",
        last.face_boxes.len(),
        last.labels.len(),
        last.marker,
    );
}
