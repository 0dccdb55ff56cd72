use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use regex::Regex;

use crate::config::{ConfigError, CrawlConfig};

static FALLBACK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// How a downloaded item is named on disk.
///
/// Order: the media URL's file token, then the page URL's item id plus suffix,
/// then `unknown_<unix nanos>_<sequence><suffix>`.
#[derive(Debug, Clone)]
pub struct FilenameRules {
    file_token: Regex,
    item_id: Regex,
    suffix: String,
}

impl FilenameRules {
    pub fn new(file_token: &str, item_id: &str, suffix: &str) -> Result<Self, ConfigError> {
        let file_token = Regex::new(file_token).map_err(|source| ConfigError::InvalidPattern {
            field: "file_token_pattern",
            source,
        })?;
        let item_id = Regex::new(item_id).map_err(|source| ConfigError::InvalidPattern {
            field: "item_id_pattern",
            source,
        })?;
        Ok(Self {
            file_token,
            item_id,
            suffix: suffix.to_string(),
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.file_token_pattern,
            &config.item_id_pattern,
            &config.file_suffix,
        )
    }

    pub fn derive(&self, media_url: &str, page_url: &str) -> String {
        if let Some(token) = self
            .file_token
            .captures(media_url)
            .and_then(|caps| caps.get(1))
            .and_then(|m| sanitize(m.as_str()))
        {
            return token;
        }
        if let Some(id) = self
            .item_id
            .find(page_url)
            .and_then(|m| sanitize(m.as_str()))
        {
            return format!("{id}{}", self.suffix);
        }
        self.fallback()
    }

    /// Distinct within a process even for calls in the same clock tick.
    pub fn fallback(&self) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = FALLBACK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("unknown_{nanos}_{seq}{}", self.suffix)
    }
}

/// Replaces characters that would escape the download directory or break on Windows.
/// Returns `None` when nothing usable is left.
fn sanitize(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return None;
    }
    let mut name = truncate_keeping_extension(cleaned, MAX_NAME_BYTES);
    if is_reserved_windows_name(&name) {
        name.insert(0, '_');
    }
    Some(name)
}

const MAX_NAME_BYTES: usize = 120;
const MAX_EXTENSION_BYTES: usize = 16;

/// Shortens the stem so the name fits in `max` bytes; a short extension survives.
fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };
    let mut end = max - ext.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ext}", &stem[..end])
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

#[cfg(test)]
mod tests {
    use super::FilenameRules;
    use crate::CrawlConfig;

    fn rules() -> FilenameRules {
        FilenameRules::from_config(&CrawlConfig::default()).unwrap()
    }

    #[test]
    fn file_token_takes_precedence() {
        assert_eq!(
            rules().derive(
                "https://cdn.example/f=abc123.mp4",
                "https://www.sokmil.com/idol/_item/item511685/"
            ),
            "abc123.mp4"
        );
    }

    #[test]
    fn file_token_stops_at_next_parameter() {
        assert_eq!(
            rules().derive("https://cdn.example/play?f=clip.mp4&t=9", "https://x.example/"),
            "clip.mp4"
        );
    }

    #[test]
    fn item_id_used_without_file_token() {
        assert_eq!(
            rules().derive(
                "https://cdn.example/stream/master.m3u8",
                "https://www.sokmil.com/idol/_item/item511685/"
            ),
            "item511685.mp4"
        );
    }

    #[test]
    fn fallback_names_never_collide() {
        let rules = rules();
        let first = rules.derive("https://cdn.example/a.mp4", "https://x.example/page");
        let second = rules.derive("https://cdn.example/a.mp4", "https://x.example/page");
        assert!(first.starts_with("unknown_"));
        assert!(first.ends_with(".mp4"));
        assert_ne!(first, second);
    }

    #[test]
    fn path_separators_cannot_escape_directory() {
        let name = rules().derive("https://cdn.example/?f=../../etc/passwd", "https://x.example/");
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
        assert_eq!(name, "etc_passwd");
    }

    #[test]
    fn long_token_keeps_extension() {
        let token = format!("{}.mp4", "a".repeat(200));
        let name = rules().derive(
            &format!("https://cdn.example/?f={token}"),
            "https://x.example/",
        );
        assert_eq!(name.len(), 120);
        assert!(name.ends_with(".mp4"));
        assert!(name.starts_with("aaaa"));
    }

    #[test]
    fn long_multibyte_token_cuts_on_char_boundary() {
        let token = format!("{}.mp4", "動".repeat(60));
        let name = rules().derive(
            &format!("https://cdn.example/?f={token}"),
            "https://x.example/",
        );
        assert!(name.len() <= 120);
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn reserved_names_are_prefixed() {
        assert_eq!(
            rules().derive("https://cdn.example/?f=CON.mp4", "https://x.example/"),
            "_CON.mp4"
        );
    }
}
