//! Immersive (WebXR) session negotiation
//!
//! The platform does the real work; the scene only asks once at startup and
//! records whether it ended up immersive or stayed on the flat canvas.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Features requested when `optional_features = true`
pub const DEFAULT_OPTIONAL_FEATURES: &[&str] = &[
    "local-floor",
    "bounded-floor",
    "hit-test",
    "anchors",
    "hand-tracking",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    ImmersiveAr,
    ImmersiveVr,
    Inline,
}

impl SessionMode {
    /// Name used by the WebXR API
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::ImmersiveAr => "immersive-ar",
            SessionMode::ImmersiveVr => "immersive-vr",
            SessionMode::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceType {
    Viewer,
    Local,
    #[default]
    LocalFloor,
    BoundedFloor,
    Unbounded,
}

impl ReferenceSpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSpaceType::Viewer => "viewer",
            ReferenceSpaceType::Local => "local",
            ReferenceSpaceType::LocalFloor => "local-floor",
            ReferenceSpaceType::BoundedFloor => "bounded-floor",
            ReferenceSpaceType::Unbounded => "unbounded",
        }
    }
}

/// `true` asks for the default feature set, `false` for none, or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionalFeatures {
    All(bool),
    List(Vec<String>),
}

impl Default for OptionalFeatures {
    fn default() -> Self {
        OptionalFeatures::All(true)
    }
}

impl OptionalFeatures {
    /// Feature names to pass to the platform
    pub fn resolve(&self) -> Vec<String> {
        match self {
            OptionalFeatures::All(true) => DEFAULT_OPTIONAL_FEATURES
                .iter()
                .map(|f| f.to_string())
                .collect(),
            OptionalFeatures::All(false) => Vec::new(),
            OptionalFeatures::List(list) => list.clone(),
        }
    }
}

/// Session request parameters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XrSessionOptions {
    #[serde(default)]
    pub session_mode: SessionMode,
    #[serde(default)]
    pub reference_space_type: ReferenceSpaceType,
    #[serde(default)]
    pub optional_features: OptionalFeatures,
}

/// What the platform granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrSessionInfo {
    pub mode: SessionMode,
    pub reference_space: ReferenceSpaceType,
    /// Features the platform reported as enabled, if it says
    pub enabled_features: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XrError {
    #[error("XR is not available on this platform")]
    Unsupported,
    #[error("session mode {0} is not supported")]
    ModeNotSupported(&'static str),
    #[error("session request denied: {0}")]
    Denied(String),
    #[error("reference space {0} unavailable")]
    ReferenceSpace(&'static str),
    /// Granted, but the renderer cannot draw into it, so it was ended again
    #[error("session granted but the renderer cannot present to it")]
    NotPresentable,
}

/// Where the scene stands with respect to immersive display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum XrStatus {
    /// The scene never asked (non-XR variant)
    #[default]
    NotRequested,
    /// Asked for but not answered yet (the platform may be waiting on the
    /// user); the scene keeps rendering on the canvas
    Pending(XrSessionOptions),
    Immersive(XrSessionInfo),
    /// Request failed; the scene stays in ordinary interactive mode
    Fallback(XrError),
}

impl XrStatus {
    pub fn is_immersive(&self) -> bool {
        matches!(self, XrStatus::Immersive(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, XrStatus::Pending(_))
    }
}

/// Platform that can negotiate an immersive session
pub trait XrPlatform {
    fn request_session(
        &self,
        options: &XrSessionOptions,
    ) -> impl Future<Output = Result<XrSessionInfo, XrError>>;
}

/// Platform without any XR runtime; every request falls back
#[derive(Debug, Clone, Copy, Default)]
pub struct NoXr;

impl XrPlatform for NoXr {
    async fn request_session(&self, _options: &XrSessionOptions) -> Result<XrSessionInfo, XrError> {
        Err(XrError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_toml() {
        let opts: XrSessionOptions = toml::from_str(
            "session_mode = \"immersive-ar\"\nreference_space_type = \"local-floor\"\noptional_features = true",
        )
        .unwrap();
        assert_eq!(opts.session_mode, SessionMode::ImmersiveAr);
        assert_eq!(opts.reference_space_type, ReferenceSpaceType::LocalFloor);
        assert_eq!(opts.optional_features, OptionalFeatures::All(true));
    }

    #[test]
    fn test_optional_feature_list() {
        let opts: XrSessionOptions =
            toml::from_str("optional_features = [\"hit-test\", \"dom-overlay\"]").unwrap();
        assert_eq!(opts.optional_features.resolve(), vec!["hit-test", "dom-overlay"]);
        assert_eq!(OptionalFeatures::All(false).resolve(), Vec::<String>::new());
        assert_eq!(
            OptionalFeatures::All(true).resolve().len(),
            DEFAULT_OPTIONAL_FEATURES.len()
        );
    }

    #[tokio::test]
    async fn test_no_xr_is_unsupported() {
        let result = NoXr.request_session(&XrSessionOptions::default()).await;
        assert_eq!(result, Err(XrError::Unsupported));
    }
}
