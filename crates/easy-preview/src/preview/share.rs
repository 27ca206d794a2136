// Share - Share links, embed snippets and startup query parameters
//
// A share link restores the previewed URL, device and dimensions when opened:
//
//   {base}?url=<encoded>&device=<id>&w=<width>&h=<height>
//
// The target URL is component-encoded before it goes into the query, so it
// appears encoded twice in the link and is decoded twice on restore.

use crate::api::ShareOptions;
use crate::error::{Error, Result};
use crate::preview::viewport::Viewport;
use serde::Serialize;
use std::borrow::Cow;
use url::Url;

/// Everything a share link encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareState {
    pub url: String,
    pub device: String,
    pub viewport: Viewport,
}

/// Generated links for the share dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub share_url: String,
    pub embed_code: String,
    pub full_screen_url: String,
}

/// Builds the share link for `state`.
pub fn generate_share_url(options: &ShareOptions, state: &ShareState) -> Result<String> {
    let mut link = options.base()?;
    link.query_pairs_mut()
        .append_pair("url", &urlencoding::encode(&state.url))
        .append_pair("device", &state.device)
        .append_pair("w", &state.viewport.width.to_string())
        .append_pair("h", &state.viewport.height.to_string());
    Ok(link.to_string())
}

/// Builds the `<iframe>` snippet embedding the preview in embed mode.
///
/// The frame source is the share link plus `embed=true`; its width and height
/// attributes are the current viewport.
pub fn generate_embed_code(options: &ShareOptions, state: &ShareState) -> Result<String> {
    let mut src = Url::parse(&generate_share_url(options, state)?).map_err(|e| {
        Error::InvalidArgument(format!("share link did not parse back: {}", e))
    })?;
    src.query_pairs_mut().append_pair("embed", "true");

    let mut code = format!(
        "<iframe src=\"{}\" width=\"{}\" height=\"{}\"",
        escape_attribute(src.as_str()),
        state.viewport.width,
        state.viewport.height
    );
    if options.frameborder_zero {
        code.push_str(" frameborder=\"0\"");
    }
    if options.allow_fullscreen {
        code.push_str(" allowfullscreen");
    }
    code.push_str("></iframe>");
    Ok(code)
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds the full-screen (embed-mode) link.
pub fn generate_full_screen_url(options: &ShareOptions, state: &ShareState) -> Result<String> {
    let mut link = options.base()?;
    link.query_pairs_mut()
        .append_pair("url", &urlencoding::encode(&state.url))
        .append_pair("w", &state.viewport.width.to_string())
        .append_pair("h", &state.viewport.height.to_string())
        .append_pair("embed", "true");
    Ok(link.to_string())
}

/// Builds all share-dialog links. Nothing can be shared before a URL is loaded.
pub fn share_links(options: &ShareOptions, state: Option<&ShareState>) -> Result<ShareLinks> {
    let state = state.filter(|s| !s.url.is_empty()).ok_or(Error::NothingToShare)?;
    Ok(ShareLinks {
        share_url: generate_share_url(options, state)?,
        embed_code: generate_embed_code(options, state)?,
        full_screen_url: generate_full_screen_url(options, state)?,
    })
}

/// Parameters read from the page address at startup.
///
/// Empty values count as absent. The `url` value gets a second
/// percent-decoding pass to undo the component encoding applied by
/// [`generate_share_url`]; a hand-written link with a plain URL is unaffected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub url: Option<String>,
    pub device: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub embed: bool,
}

impl QueryState {
    /// Parses a raw query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = QueryState::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "url" => &mut state.url,
                "device" => &mut state.device,
                "w" => &mut state.width,
                "h" => &mut state.height,
                "embed" => {
                    state.embed = value == "true";
                    continue;
                }
                _ => continue,
            };
            // First occurrence wins, like URLSearchParams::get
            if slot.is_none() {
                *slot = Some(if key == "url" {
                    decode_component(value)
                } else {
                    value.into_owned()
                });
            }
        }
        state
    }

    /// Parses the query of a full page address.
    pub fn from_page_url(page_url: &str) -> Result<Self> {
        let parsed = Url::parse(page_url).map_err(|e| Error::InvalidUrl {
            input: page_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_query(parsed.query().unwrap_or_default()))
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.device.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Undoes one round of component encoding. Invalid UTF-8 after decoding
/// leaves the value as it was.
fn decode_component(value: Cow<'_, str>) -> String {
    let decoded = urlencoding::decode(&value).map(Cow::into_owned);
    match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("Keeping url parameter as is: {}", e);
            value.into_owned()
        }
    }
}
