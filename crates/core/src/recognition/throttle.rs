use std::collections::HashMap;
use std::time::Instant;

use log::{debug, warn};

use crate::recognition::label_cache::LabelCache;
use crate::recognition::recognizer::{
    FaceRegion, RecognitionRequest, RecognitionResult, RecognitionService,
};
use crate::shared::constants::{
    DEFAULT_MAX_MATCHES, DEFAULT_SIMILARITY_THRESHOLD, RECOGNITION_MIN_INTERVAL,
};
use crate::shared::viewport::ViewportRect;
use crate::shared::RequestId;

/// Parameters of the external identity search.
#[derive(Clone, Debug)]
pub struct RecognitionConfig {
    /// Identity collection searched by the service.
    pub collection_id: String,
    pub similarity_threshold: f32,
    pub max_results: usize,
    /// Minimum spacing between dispatched batches.
    pub min_interval: std::time::Duration,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            collection_id: "faces".to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_results: DEFAULT_MAX_MATCHES,
            min_interval: RECOGNITION_MIN_INTERVAL,
        }
    }
}

/// Rate gate and bookkeeping in front of the recognition port.
///
/// Batches arriving inside the minimum interval are dropped whole; a
/// dropped batch leaves the label cache and the dispatch timestamp alone,
/// so labels from the previous batch stay on screen. When a batch does go
/// out, every label hides first and only fresh matches bring them back.
#[derive(Debug, Default)]
pub struct RecognitionThrottle {
    config: RecognitionConfig,
    last_dispatch: Option<Instant>,
    next_id: RequestId,
    /// Viewport anchor of each in-flight crop, keyed by request id.
    pending: HashMap<RequestId, ViewportRect>,
}

impl RecognitionThrottle {
    pub fn new(config: RecognitionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Dispatches one crop per region unless the batch falls inside the
    /// minimum interval. Returns whether the batch went out.
    pub fn try_dispatch(
        &mut self,
        regions: Vec<FaceRegion>,
        now: Instant,
        service: &mut dyn RecognitionService,
        cache: &mut LabelCache,
    ) -> bool {
        if regions.is_empty() {
            return false;
        }
        if let Some(last) = self.last_dispatch {
            if now.duration_since(last) < self.config.min_interval {
                debug!(
                    "recognition batch of {} dropped by rate gate",
                    regions.len()
                );
                return false;
            }
        }

        self.last_dispatch = Some(now);
        // Stragglers from an earlier batch must not resurface labels the
        // new batch just hid; only this batch's results may show them.
        self.pending.clear();
        cache.hide_all();
        for region in regions {
            let Some(image_bytes) = region.crop.encode_png() else {
                warn!("face crop could not be encoded, skipping");
                continue;
            };
            let id = self.next_id;
            self.next_id += 1;
            let request = RecognitionRequest {
                id,
                image_bytes,
                collection_id: self.config.collection_id.clone(),
                similarity_threshold: self.config.similarity_threshold,
                max_results: self.config.max_results,
            };
            if let Err(err) = service.search(request) {
                warn!("recognition dispatch failed: {err}");
                continue;
            }
            self.pending.insert(id, region.bounds);
        }
        true
    }

    /// Folds one completion into the label cache. Results for unknown ids
    /// are ignored.
    pub fn on_result(&mut self, result: RecognitionResult, cache: &mut LabelCache) {
        let Some(anchor) = self.pending.remove(&result.id) else {
            debug!("recognition result {} has no pending request", result.id);
            return;
        };
        match result.outcome {
            Ok(matches) => match matches.first() {
                Some(best) => cache.apply_match(&best.identity, anchor),
                None => debug!("recognition request {} matched nobody", result.id),
            },
            Err(err) => warn!("recognition request {} failed: {err}", result.id),
        }
    }
}
