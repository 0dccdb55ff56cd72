use std::collections::HashSet;
use std::fmt;

use url::Url;

/// A URL refused by [`ItemUrlSet::insert`] because it is not absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUrl {
    pub url: String,
}

impl fmt::Display for RejectedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not an absolute url: {}", self.url)
    }
}

impl std::error::Error for RejectedUrl {}

/// Ordered, duplicate-free set of absolute item URLs.
///
/// Keys are the exact strings inserted; the first occurrence keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUrlSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ItemUrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning `Ok(false)` when it was already present.
    pub fn insert(&mut self, url: &str) -> Result<bool, RejectedUrl> {
        if !is_absolute(url) {
            return Err(RejectedUrl {
                url: url.to_string(),
            });
        }
        if self.seen.contains(url) {
            return Ok(false);
        }
        self.seen.insert(url.to_string());
        self.order.push(url.to_string());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl<'a> IntoIterator for &'a ItemUrlSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

fn is_absolute(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => !url.cannot_be_a_base() && url.host_str().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::ItemUrlSet;

    #[test]
    fn relative_paths_are_refused() {
        let mut set = ItemUrlSet::new();
        assert!(set.insert("/idol/_item/item1").is_err());
        assert!(set.insert("idol/_item/item1").is_err());
        assert!(set.insert("mailto:someone@example.com").is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn first_occurrence_wins() {
        let mut set = ItemUrlSet::new();
        assert_eq!(set.insert("https://a.example/item2"), Ok(true));
        assert_eq!(set.insert("https://a.example/item1"), Ok(true));
        assert_eq!(set.insert("https://a.example/item2"), Ok(false));
        let urls: Vec<&str> = set.iter().collect();
        assert_eq!(urls, vec!["https://a.example/item2", "https://a.example/item1"]);
    }
}
