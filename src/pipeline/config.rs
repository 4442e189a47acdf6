//! Mount configuration.

use std::time::Duration;

/// Default pause between frames when no animation-frame host exists.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Class of the `<pre>` the default error view renders.
pub const DEFAULT_ERROR_CLASS: &str = "onecup-error";

/// What paces frame boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    /// The host calls [`App::frame`](super::App::frame) from its own frame
    /// callback. The runtime never sleeps.
    AnimationFrame,
    /// No host loop: [`App::tick`](super::App::tick) sleeps this long between
    /// frames.
    Timer(Duration),
}

impl Default for FrameSource {
    fn default() -> Self {
        FrameSource::Timer(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameSource {
    /// Pause after a frame, if any.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            FrameSource::AnimationFrame => None,
            FrameSource::Timer(interval) => Some(*interval),
        }
    }
}

/// Options for [`mount`](super::mount).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    pub frame_source: FrameSource,
    /// Class on the default error view.
    pub error_class: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            frame_source: FrameSource::default(),
            error_class: DEFAULT_ERROR_CLASS.to_string(),
        }
    }
}

impl MountConfig {
    pub fn with_frame_source(mut self, frame_source: FrameSource) -> Self {
        self.frame_source = frame_source;
        self
    }

    pub fn with_error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MountConfig::default();
        assert_eq!(config.frame_source, FrameSource::Timer(Duration::from_millis(16)));
        assert_eq!(config.error_class, "onecup-error");
        assert_eq!(config.frame_source.interval(), Some(DEFAULT_FRAME_INTERVAL));
    }

    #[test]
    fn test_builders() {
        let config = MountConfig::default()
            .with_frame_source(FrameSource::AnimationFrame)
            .with_error_class("oops");
        assert_eq!(config.frame_source.interval(), None);
        assert_eq!(config.error_class, "oops");
    }
}
