use crawl_logging::crawl_debug;
use scraper::Selector;
use url::Url;

use crate::document::{parse_selector, SelectorError};
use crate::{FetchError, FetchSettings, HttpTransport};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("consent gate request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("confirmation link not found on {gate_url}")]
    ConfirmationLinkNotFound { gate_url: String },
    #[error("confirmation link `{href}` cannot be resolved against {gate_url}")]
    InvalidConfirmationLink { gate_url: String, href: String },
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// An HTTP client that has passed the consent gate.
///
/// Every request of the crawl goes through [`Session::transport`], so the
/// verification cookies travel with all of them.
#[derive(Debug, Clone)]
pub struct Session {
    transport: HttpTransport,
    gate_url: String,
    confirm_selector: Selector,
    landing_url: String,
}

impl Session {
    /// Builds a fresh cookie-bearing client and confirms consent with it.
    pub async fn establish(
        gate_url: &str,
        confirm_selector: &str,
        settings: FetchSettings,
    ) -> Result<Self, SessionError> {
        let transport = HttpTransport::new(settings)?;
        Self::establish_with(transport, gate_url, confirm_selector).await
    }

    /// Confirms consent on an existing transport, keeping its cookie jar.
    pub async fn establish_with(
        transport: HttpTransport,
        gate_url: &str,
        confirm_selector: &str,
    ) -> Result<Self, SessionError> {
        let confirm_selector = parse_selector(confirm_selector)?;
        let landing_url = confirm_consent(&transport, gate_url, &confirm_selector).await?;
        crawl_debug!("consent confirmed via {}", gate_url);
        Ok(Self {
            transport,
            gate_url: gate_url.to_string(),
            confirm_selector,
            landing_url,
        })
    }

    /// Walks the gate again on the same client. Safe on an already verified session.
    pub async fn reconfirm(&self) -> Result<String, SessionError> {
        confirm_consent(&self.transport, &self.gate_url, &self.confirm_selector).await
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn gate_url(&self) -> &str {
        &self.gate_url
    }

    /// Where the confirmation link finally led.
    pub fn landing_url(&self) -> &str {
        &self.landing_url
    }
}

async fn confirm_consent(
    transport: &HttpTransport,
    gate_url: &str,
    confirm_selector: &Selector,
) -> Result<String, SessionError> {
    let confirm_url = {
        let gate = transport.get_document(gate_url, None).await?;
        let href = gate
            .first_attr(confirm_selector, "href")
            .ok_or_else(|| SessionError::ConfirmationLinkNotFound {
                gate_url: gate_url.to_string(),
            })?;
        resolve_confirmation(gate.url(), &href)?
    };

    crawl_debug!("following confirmation link {}", confirm_url);
    let landing = transport.visit(&confirm_url, Some(gate_url)).await?;
    Ok(landing)
}

fn resolve_confirmation(gate_url: &str, href: &str) -> Result<String, SessionError> {
    let invalid = || SessionError::InvalidConfirmationLink {
        gate_url: gate_url.to_string(),
        href: href.to_string(),
    };
    if let Ok(absolute) = Url::parse(href) {
        return Ok(absolute.into());
    }
    let base = Url::parse(gate_url).map_err(|_| invalid())?;
    base.join(href).map(String::from).map_err(|_| invalid())
}
