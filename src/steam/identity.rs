//! Steam ID resolution from free-form user input

use lazy_static::lazy_static;
use regex::Regex;

use super::SteamClient;
use crate::error::{InventoryError, Result};
use crate::models::SteamId;

lazy_static! {
    static ref PROFILE_PATH: Regex = Regex::new(r"profiles/(\d+)").unwrap();
    static ref VANITY_PATH: Regex = Regex::new(r"id/([^/?#\s]+)").unwrap();
    static ref STEAM_ID64_TAG: Regex = Regex::new(r"<steamID64>(\d+)</steamID64>").unwrap();
}

/// What a piece of user input refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityInput {
    /// Already a numeric Steam ID (bare or taken from a `profiles/` URL)
    SteamId(SteamId),
    /// Custom profile name that needs a lookup
    Vanity(String),
}

/// Classifies input without touching the network.
///
/// Rules, first match wins: all digits, a `profiles/<digits>` segment,
/// an `id/<name>` segment, otherwise the whole input as a vanity name.
/// Returns `None` for blank input.
pub fn classify_input(input: &str) -> Option<IdentityInput> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = SteamId::parse(input) {
        return Some(IdentityInput::SteamId(id));
    }

    if let Some(id) = PROFILE_PATH
        .captures(input)
        .and_then(|caps| SteamId::parse(&caps[1]))
    {
        return Some(IdentityInput::SteamId(id));
    }

    if let Some(caps) = VANITY_PATH.captures(input) {
        return Some(IdentityInput::Vanity(caps[1].to_string()));
    }

    Some(IdentityInput::Vanity(input.to_string()))
}

/// Pulls the `<steamID64>` value out of a profile XML document
pub(crate) fn extract_steam_id64(body: &str) -> Option<SteamId> {
    STEAM_ID64_TAG
        .captures(body)
        .and_then(|caps| SteamId::parse(&caps[1]))
}

impl SteamClient {
    /// Resolves user input to a Steam ID. Failures are logged and reported as `None`.
    pub async fn resolve_identity(&self, input: &str) -> Option<SteamId> {
        match classify_input(input)? {
            IdentityInput::SteamId(id) => Some(id),
            IdentityInput::Vanity(name) => match self.fetch_vanity(&name).await {
                Ok(id) => {
                    log::debug!("Resolved vanity name '{}' to {}", name, id);
                    Some(id)
                }
                Err(e) => {
                    log::debug!(
                        "Vanity lookup for '{}' failed ({}): {}",
                        name,
                        e.kind(),
                        e
                    );
                    None
                }
            },
        }
    }

    /// Looks up a vanity name through the profile XML endpoint
    pub async fn fetch_vanity(&self, name: &str) -> Result<SteamId> {
        let url = format!(
            "{}/id/{}/?xml=1",
            self.base_url,
            urlencoding::encode(name.trim())
        );

        log::debug!("Resolving vanity name: {}", name);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(InventoryError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        extract_steam_id64(&body).ok_or_else(|| InventoryError::Unresolved(name.to_string()))
    }
}
