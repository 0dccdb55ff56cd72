use regex::Regex;

use crate::config::ConfigError;

/// Finds the media resource URL inside an item page's markup.
pub trait MediaExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> Option<String>;
}

/// Regex-based extractor for script literals such as `video_url: 'https://...'`.
///
/// The first capture group is the URL.
#[derive(Debug, Clone)]
pub struct PatternMediaExtractor {
    pattern: Regex,
}

impl PatternMediaExtractor {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            field: "media_pattern",
            source,
        })?;
        Ok(Self { pattern })
    }
}

impl MediaExtractor for PatternMediaExtractor {
    fn extract(&self, markup: &str) -> Option<String> {
        self.pattern
            .captures(markup)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|url| !url.is_empty())
    }
}
