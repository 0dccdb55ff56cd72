use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Selector};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode body as {encoding}")]
    Malformed { encoding: String },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid selector `{selector}`: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

/// Compiles a CSS selector, keeping the offending text in the error.
pub fn parse_selector(raw: &str) -> Result<Selector, SelectorError> {
    Selector::parse(raw).map_err(|err| SelectorError {
        selector: raw.to_string(),
        message: err.to_string(),
    })
}

/// Parsed HTML response body.
///
/// The underlying tree is not `Send`; extract what you need before the next `.await`.
#[derive(Debug)]
pub struct Document {
    url: String,
    encoding: &'static str,
    html: Html,
}

impl Document {
    pub fn parse(url: impl Into<String>, markup: &str) -> Self {
        Self {
            url: url.into(),
            encoding: encoding_rs::UTF_8.name(),
            html: Html::parse_document(markup),
        }
    }

    /// Decodes raw bytes (BOM, then Content-Type charset, then detection) and parses them.
    pub fn from_bytes(
        url: impl Into<String>,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let encoding = detect_encoding(bytes, content_type);
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(DecodeError::Malformed {
                encoding: encoding.name().to_string(),
            });
        }
        Ok(Self {
            url: url.into(),
            encoding: encoding.name(),
            html: Html::parse_document(&text),
        })
    }

    /// Final URL the document was served from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    /// First non-empty `attr` value among elements matching `selector`.
    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.html
            .select(selector)
            .filter_map(|element| element.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// All `attr` values among elements matching `selector`, in document order.
    pub fn attr_values<'a>(
        &'a self,
        selector: &'a Selector,
        attr: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.html
            .select(selector)
            .filter_map(move |element| element.value().attr(attr))
    }

    /// Serializes the parsed tree back to markup.
    pub fn to_markup(&self) -> String {
        self.html.html()
    }
}

fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}
