use serde::{Deserialize, Serialize};

/// Configuration for the foodgram module (`modules.foodgram` in the app config).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodgramConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// `recipes_limit` used when the subscriptions listing gets none or an invalid one.
    #[serde(default = "default_recipes_limit_value")]
    pub default_recipes_limit: u64,
    #[serde(default = "default_min_value")]
    pub min_cooking_time: i32,
    #[serde(default = "default_max_value")]
    pub max_cooking_time: i32,
    #[serde(default = "default_min_value")]
    pub min_amount: i32,
    #[serde(default = "default_max_value")]
    pub max_amount: i32,
    /// Directory for uploaded images; relative paths resolve against the server home dir.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// URL prefix under which `media_root` is served.
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// Public origin used for short links, e.g. "https://foodgram.example".
    /// When unset the request `Host` header is used.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for FoodgramConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            default_recipes_limit: default_recipes_limit_value(),
            min_cooking_time: default_min_value(),
            max_cooking_time: default_max_value(),
            min_amount: default_min_value(),
            max_amount: default_max_value(),
            media_root: default_media_root(),
            media_url: default_media_url(),
            public_url: None,
        }
    }
}

fn default_page_size() -> u64 {
    6
}

fn default_max_page_size() -> u64 {
    100
}

fn default_recipes_limit_value() -> u64 {
    3
}

fn default_min_value() -> i32 {
    1
}

fn default_max_value() -> i32 {
    32_000
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_media_url() -> String {
    "/media/".to_string()
}
