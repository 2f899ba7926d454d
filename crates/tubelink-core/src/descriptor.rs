use serde::{Deserialize, Serialize, Serializer};

/// A resolved, directly playable stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Playable resource locator.
    pub url: String,
    /// Length of the media in seconds, if the upstream reports it.
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Option<f64>,
    /// Human-readable title, if the upstream reports it.
    pub title: Option<String>,
}

impl StreamDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            duration: None,
            title: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

// Whole seconds go out as JSON integers so `212` does not turn into `212.0`.
fn serialize_seconds<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(secs) if secs.is_finite() && secs.fract() == 0.0 && *secs >= 0.0 => {
            serializer.serialize_some(&(*secs as u64))
        }
        Some(secs) => serializer.serialize_some(secs),
        None => serializer.serialize_none(),
    }
}
