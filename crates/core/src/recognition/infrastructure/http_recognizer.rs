use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::recognition::infrastructure::threaded_recognizer::SearchFn;
use crate::recognition::recognizer::{RecognitionError, RecognitionMatch, RecognitionRequest};

/// One candidate in the service response.
#[derive(Debug, Deserialize)]
struct MatchRecord {
    identity: String,
    similarity: f32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    matches: Vec<MatchRecord>,
}

/// Identity search over a plain HTTP endpoint.
///
/// Sends the PNG crop as the request body; collection and match limits go
/// in the query string. Intended to run on the recognition worker thread,
/// hence the blocking client.
pub struct HttpRecognizer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpRecognizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
        }
    }

    pub fn search(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionMatch>, RecognitionError> {
        debug!(
            "searching collection {} with a {}-byte crop",
            request.collection_id,
            request.image_bytes.len()
        );
        let threshold = request.similarity_threshold.to_string();
        let max_results = request.max_results.to_string();
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("collection_id", request.collection_id.as_str()),
                ("similarity_threshold", threshold.as_str()),
                ("max_results", max_results.as_str()),
            ])
            .body(request.image_bytes.clone())
            .send()
            .map_err(|err| RecognitionError::Service(err.to_string()))?
            .error_for_status()
            .map_err(|err| RecognitionError::Service(err.to_string()))?;
        let parsed: SearchResponse = serde_json::from_reader(response)
            .map_err(|err| RecognitionError::Service(err.to_string()))?;
        Ok(parse_matches(parsed))
    }

    /// Adapter for [`ThreadedRecognitionService::spawn`].
    ///
    /// [`ThreadedRecognitionService::spawn`]:
    /// crate::recognition::infrastructure::threaded_recognizer::ThreadedRecognitionService::spawn
    pub fn into_search_fn(self) -> SearchFn {
        Box::new(move |request| self.search(request))
    }
}

/// Best match first, regardless of response order.
fn parse_matches(response: SearchResponse) -> Vec<RecognitionMatch> {
    let mut matches: Vec<RecognitionMatch> = response
        .matches
        .into_iter()
        .map(|record| RecognitionMatch {
            identity: record.identity,
            similarity: record.similarity,
        })
        .collect();
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_are_ranked_best_first() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"matches": [
                {"identity": "alice", "similarity": 91.5},
                {"identity": "bob", "similarity": 97.25}
            ]}"#,
        )
        .unwrap();

        let matches = parse_matches(response);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].identity, "bob");
        assert_eq!(matches[1].identity, "alice");
    }

    #[test]
    fn test_empty_match_list_parses() {
        let response: SearchResponse = serde_json::from_str(r#"{"matches": []}"#).unwrap();
        assert!(parse_matches(response).is_empty());
    }
}
