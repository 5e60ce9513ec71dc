pub mod domain;
pub mod ranking;
pub mod time;

pub mod config {
    use anyhow::Context;

    use crate::ranking::DEFAULT_FEED_SIZE;

    const DEFAULT_FEED_MAX_SIZE: usize = 200;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub feed_size: usize,
        pub feed_max_size: usize,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                feed_size: DEFAULT_FEED_SIZE,
                feed_max_size: DEFAULT_FEED_MAX_SIZE,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            let settings = Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                feed_size: parse_env_usize("FEED_SIZE")?.unwrap_or(defaults.feed_size),
                feed_max_size: parse_env_usize("FEED_MAX_SIZE")?
                    .unwrap_or(defaults.feed_max_size),
            };

            anyhow::ensure!(
                settings.feed_size <= settings.feed_max_size,
                "FEED_SIZE ({}) must not exceed FEED_MAX_SIZE ({})",
                settings.feed_size,
                settings.feed_max_size
            );

            Ok(settings)
        }

        /// Feed size for one request: the configured default when absent, rejected above the cap.
        pub fn resolve_feed_size(&self, requested: Option<usize>) -> anyhow::Result<usize> {
            let k = requested.unwrap_or(self.feed_size);
            anyhow::ensure!(
                k <= self.feed_max_size,
                "requested feed size {k} exceeds maximum {}",
                self.feed_max_size
            );
            Ok(k)
        }
    }

    fn parse_env_usize(key: &str) -> anyhow::Result<Option<usize>> {
        let Ok(raw) = std::env::var(key) else {
            return Ok(None);
        };
        let value = raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer (got {raw:?})"))?;
        Ok(Some(value))
    }

}
