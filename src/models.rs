//! Data model shared by the fetcher, joiner and aggregator

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical 64-bit Steam profile ID, kept in its decimal string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SteamId(String);

impl SteamId {
    /// Wraps a string of decimal digits; anything else is rejected.
    pub fn parse(digits: &str) -> Option<Self> {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key linking assets to their description: (classid, instanceid)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub class_id: String,
    pub instance_id: String,
}

/// One inventory holding as listed by the inventory endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Asset {
    #[serde(default, deserialize_with = "u32_lenient")]
    pub appid: u32,
    #[serde(default, deserialize_with = "string_lenient")]
    pub contextid: String,
    #[serde(deserialize_with = "string_lenient")]
    pub assetid: String,
    #[serde(deserialize_with = "string_lenient")]
    pub classid: String,
    #[serde(default = "zero_instance", deserialize_with = "string_lenient")]
    pub instanceid: String,
    #[serde(default = "one", deserialize_with = "u32_lenient")]
    pub amount: u32,
}

impl Asset {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            class_id: self.classid.clone(),
            instance_id: self.instanceid.clone(),
        }
    }
}

/// Item metadata shared by every asset with the same composite key
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Description {
    #[serde(default, deserialize_with = "u32_lenient")]
    pub appid: u32,
    #[serde(deserialize_with = "string_lenient")]
    pub classid: String,
    #[serde(default = "zero_instance", deserialize_with = "string_lenient")]
    pub instanceid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(default)]
    pub market_hash_name: String,
    #[serde(default, rename = "type")]
    pub item_type: String,
    #[serde(default, deserialize_with = "flag")]
    pub tradable: bool,
    #[serde(default, deserialize_with = "flag")]
    pub marketable: bool,
    #[serde(default, deserialize_with = "flag")]
    pub commodity: bool,
}

impl Description {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            class_id: self.classid.clone(),
            instance_id: self.instanceid.clone(),
        }
    }
}

/// One page of `/inventory/{steamid}/{appid}/{contextid}`
#[derive(Debug, Deserialize)]
pub struct InventoryPage {
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub descriptions: Vec<Description>,
    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_inventory_count: u32,
    #[serde(default, deserialize_with = "flag")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub more_items: bool,
    #[serde(default)]
    pub last_assetid: Option<String>,
}

impl InventoryPage {
    /// Cursor for the next page, if Steam says there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.more_items {
            return None;
        }
        self.last_assetid.as_deref().filter(|id| !id.is_empty())
    }
}

/// Response of `/market/priceoverview/`
#[derive(Debug, Deserialize)]
pub struct MarketPriceResponse {
    #[serde(default, deserialize_with = "flag")]
    pub success: bool,
    #[serde(default)]
    pub lowest_price: Option<String>,
    #[serde(default)]
    pub median_price: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

/// Application/context pair selecting one item collection of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Game {
    pub app_id: u32,
    pub context_id: u32,
    pub name: &'static str,
}

/// Games scanned when no application is given
pub const KNOWN_GAMES: [Game; 6] = [
    Game { app_id: 730, context_id: 2, name: "Counter-Strike 2" },
    Game { app_id: 570, context_id: 2, name: "Dota 2" },
    Game { app_id: 753, context_id: 6, name: "Steam Items" },
    Game { app_id: 440, context_id: 2, name: "Team Fortress 2" },
    Game { app_id: 578080, context_id: 2, name: "PUBG" },
    Game { app_id: 252490, context_id: 2, name: "Rust" },
];

/// Counter-Strike 2, used when a command names no application
pub const DEFAULT_APP_ID: u32 = 730;

impl Game {
    /// Looks up a known game; unknown apps default to context 2.
    pub fn from_app_id(app_id: u32) -> Self {
        KNOWN_GAMES
            .iter()
            .copied()
            .find(|g| g.app_id == app_id)
            .unwrap_or(Game {
                app_id,
                context_id: 2,
                name: "Unknown game",
            })
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.app_id)
    }
}

/// A marketable asset joined with its description and a resolved price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedItem {
    pub asset_id: String,
    pub app_id: u32,
    pub context_id: String,
    pub amount: u32,
    pub name: String,
    pub market_name: String,
    pub market_hash_name: String,
    pub item_type: String,
    /// Price as quoted by the market, e.g. "15,50 руб. (lowest)"
    pub price: String,
    /// Numeric value of `price`
    pub value: f64,
}

impl PricedItem {
    pub fn new(asset: &Asset, description: &Description, price: String) -> Self {
        let value = crate::steam::parse_price(&price);
        Self {
            asset_id: asset.assetid.clone(),
            app_id: asset.appid,
            context_id: asset.contextid.clone(),
            amount: asset.amount,
            name: description.name.clone(),
            market_name: description.market_name.clone(),
            market_hash_name: description.market_hash_name.clone(),
            item_type: description.item_type.clone(),
            price,
            value,
        }
    }
}

// Steam is inconsistent about numbers vs strings and ints vs bools, so the
// wire types accept either form.

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n == 1,
        Some(Loose::Float(n)) => n == 1.0,
        Some(Loose::Str(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        None => false,
    })
}

fn string_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Str(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(n)) => n.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}

fn u32_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    use serde::de::Error;

    match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(n)) => u32::try_from(n).map_err(D::Error::custom),
        Some(Loose::Str(s)) => s.trim().parse().map_err(D::Error::custom),
        Some(Loose::Float(n)) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Ok(n as u32)
        }
        Some(_) => Err(D::Error::custom("expected an unsigned integer")),
        None => Ok(0),
    }
}

fn zero_instance() -> String {
    "0".to_string()
}

fn one() -> u32 {
    1
}
