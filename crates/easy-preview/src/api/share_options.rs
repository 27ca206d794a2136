// Share options for generated links and embed snippets

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Options for share-link and embed-code generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOptions {
    /// Address of the preview page itself (origin + path)
    pub base_url: String,

    /// Emit `frameborder="0"` on the embed snippet (default: true)
    #[serde(default = "default_true")]
    pub frameborder_zero: bool,

    /// Emit `allowfullscreen` on the embed snippet (default: true)
    #[serde(default = "default_true")]
    pub allow_fullscreen: bool,
}

fn default_true() -> bool {
    true
}

impl ShareOptions {
    /// Creates options for a preview page served at `base_url`.
    ///
    /// Any query string or fragment on `base_url` is dropped.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| Error::InvalidUrl {
            input: base_url.to_string(),
            reason: e.to_string(),
        })?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base_url: base.to_string(),
            frameborder_zero: true,
            allow_fullscreen: true,
        })
    }

    /// Set whether the embed snippet carries `frameborder="0"`
    pub fn frameborder_zero(mut self, enabled: bool) -> Self {
        self.frameborder_zero = enabled;
        self
    }

    /// Set whether the embed snippet carries `allowfullscreen`
    pub fn allow_fullscreen(mut self, enabled: bool) -> Self {
        self.allow_fullscreen = enabled;
        self
    }

    /// Parsed base URL.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl {
            input: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}
