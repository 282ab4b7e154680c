use std::sync::Arc;

use thiserror::Error;

/// Event emitted for every outgoing API request.
pub const API_REQUEST_EVENT: &str = "API_REQUEST";

#[derive(Debug, Error)]
#[error("analytics sink rejected event: {reason}")]
pub struct AnalyticsError {
    pub reason: String,
}

/// Side-channel telemetry sink. Implementations may fail; the
/// transport treats every failure as log-and-continue, so a broken
/// sink can never fail or delay a request.
pub trait Analytics: Send + Sync {
    fn track(&self, event: &str, properties: serde_json::Value) -> Result<(), AnalyticsError>;
}

/// Best-effort emit: failures are logged and swallowed.
pub(crate) fn track_event(
    sink: Option<&Arc<dyn Analytics>>,
    event: &str,
    properties: serde_json::Value,
) {
    if let Some(sink) = sink {
        if let Err(err) = sink.track(event, properties) {
            tracing::warn!(event, error = %err, "analytics tracking error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Failing;

    impl Analytics for Failing {
        fn track(&self, _: &str, _: serde_json::Value) -> Result<(), AnalyticsError> {
            Err(AnalyticsError {
                reason: "sink offline".to_string(),
            })
        }
    }

    struct Recording(Mutex<Vec<String>>);

    impl Analytics for Recording {
        fn track(&self, event: &str, _: serde_json::Value) -> Result<(), AnalyticsError> {
            self.0.lock().unwrap().push(event.to_string());
            Ok(())
        }
    }

    #[test]
    fn failures_are_swallowed() {
        let sink: Arc<dyn Analytics> = Arc::new(Failing);
        track_event(Some(&sink), API_REQUEST_EVENT, serde_json::json!({}));
    }

    #[test]
    fn events_reach_the_sink() {
        let recording = Arc::new(Recording(Mutex::new(Vec::new())));
        let sink: Arc<dyn Analytics> = recording.clone();
        track_event(Some(&sink), API_REQUEST_EVENT, serde_json::json!({}));
        assert_eq!(*recording.0.lock().unwrap(), vec![API_REQUEST_EVENT]);
    }
}
