//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Origin of a clip candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Pexels stock video API.
    #[default]
    Pexels,
    /// Pixabay stock video API.
    Pixabay,
    /// Files already on local disk.
    Local,
}

impl ProviderKind {
    /// Stable lowercase identifier (used in metadata and CLI).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Pexels => "pexels",
            ProviderKind::Pixabay => "pixabay",
            ProviderKind::Local => "local",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pexels" => Ok(ProviderKind::Pexels),
            "pixabay" => Ok(ProviderKind::Pixabay),
            "local" => Ok(ProviderKind::Local),
            other => Err(format!("unknown footage source '{}'", other)),
        }
    }
}

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoAspect {
    /// 9:16, 1080x1920.
    #[default]
    Portrait,
    /// 16:9, 1920x1080.
    Landscape,
    /// 1:1, 1080x1080.
    Square,
}

impl VideoAspect {
    /// Target resolution as (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            VideoAspect::Portrait => (1080, 1920),
            VideoAspect::Landscape => (1920, 1080),
            VideoAspect::Square => (1080, 1080),
        }
    }

    /// Orientation name as understood by stock providers.
    pub fn orientation(&self) -> &'static str {
        match self {
            VideoAspect::Portrait => "portrait",
            VideoAspect::Landscape => "landscape",
            VideoAspect::Square => "square",
        }
    }
}

impl std::fmt::Display for VideoAspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.orientation())
    }
}

impl std::str::FromStr for VideoAspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" | "9:16" => Ok(VideoAspect::Portrait),
            "landscape" | "16:9" => Ok(VideoAspect::Landscape),
            "square" | "1:1" => Ok(VideoAspect::Square),
            other => Err(format!("unknown aspect '{}'", other)),
        }
    }
}

/// How downloaded clips are ordered before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcatMode {
    /// Shuffle the selection before downloading and per rendered video.
    #[default]
    Random,
    /// Keep the scorer's order.
    Sequential,
}

/// Transition applied between rendered segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionMode {
    /// Hard cuts.
    #[default]
    None,
    /// Short fade-in at the start of each segment.
    Fade,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("Pexels".parse::<ProviderKind>(), Ok(ProviderKind::Pexels));
        assert_eq!(" local ".parse::<ProviderKind>(), Ok(ProviderKind::Local));
        assert!("vimeo".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn aspect_resolutions() {
        assert_eq!(VideoAspect::Portrait.resolution(), (1080, 1920));
        assert_eq!(VideoAspect::Landscape.resolution(), (1920, 1080));
        assert_eq!("16:9".parse::<VideoAspect>(), Ok(VideoAspect::Landscape));
    }

    #[test]
    fn enums_serialize_lowercase() {
        let json = serde_json::to_string(&ConcatMode::Sequential).unwrap();
        assert_eq!(json, "\"sequential\"");
        let json = serde_json::to_string(&ProviderKind::Pixabay).unwrap();
        assert_eq!(json, "\"pixabay\"");
    }
}
