//! Replay configuration.

use std::time::Duration;

/// Environment variable holding the paint notification delay in milliseconds.
pub const REFRESH_FREQUENCY_VAR: &str = "PDFX_REFRESH_FREQUENCY";

/// Environment variable turning the append-time image downscale on or off.
pub const SCALE_IMAGES_VAR: &str = "PDFX_SCALE_IMAGES";

const DEFAULT_PAINT_DELAY: Duration = Duration::from_millis(250);

/// Settings shared by a drawing log and every replay of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Minimum time between two progress notifications during a replay
    pub paint_delay: Duration,
    /// Shrink images wider than 1000 pixels when they are appended
    pub scale_images: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            paint_delay: DEFAULT_PAINT_DELAY,
            scale_images: true,
        }
    }
}

impl ReplayConfig {
    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults; malformed ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ReplayConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReplayConfig::default();

        if let Some(raw) = lookup(REFRESH_FREQUENCY_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.paint_delay = Duration::from_millis(ms),
                Err(_) => log::warn!(
                    "ignoring {}={:?}: expected milliseconds",
                    REFRESH_FREQUENCY_VAR,
                    raw
                ),
            }
        }

        if let Some(raw) = lookup(SCALE_IMAGES_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => config.scale_images = true,
                "false" | "0" => config.scale_images = false,
                _ => log::warn!(
                    "ignoring {}={:?}: expected true or false",
                    SCALE_IMAGES_VAR,
                    raw
                ),
            }
        }

        config
    }

    pub fn with_paint_delay(mut self, delay: Duration) -> Self {
        self.paint_delay = delay;
        self
    }

    pub fn with_scale_images(mut self, scale: bool) -> Self {
        self.scale_images = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::from_lookup(|_| None);
        assert_eq!(config, ReplayConfig::default());
        assert_eq!(config.paint_delay, Duration::from_millis(250));
        assert!(config.scale_images);
    }

    #[test]
    fn test_overrides() {
        let config = ReplayConfig::from_lookup(lookup(&[
            (REFRESH_FREQUENCY_VAR, "100"),
            (SCALE_IMAGES_VAR, "FALSE"),
        ]));
        assert_eq!(config.paint_delay, Duration::from_millis(100));
        assert!(!config.scale_images);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = ReplayConfig::from_lookup(lookup(&[
            (REFRESH_FREQUENCY_VAR, "soon"),
            (SCALE_IMAGES_VAR, "maybe"),
        ]));
        assert_eq!(config, ReplayConfig::default());
    }
}
