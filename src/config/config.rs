use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "STACKSIFT_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL including the version prefix
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Listings per page
    pub page_size: usize,

    /// Quiet period before a search is sent
    pub debounce_ms: u64,

    /// Shortest term that may be topped up with AI suggestions
    pub ai_min_term_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for markers (AI, liked, pending)
    pub use_glyphs: bool,

    /// Show the description column in result tables
    pub show_descriptions: bool,

    /// Icons for different states (can be overridden)
    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub ai: String,
    pub liked: String,
    pub pending: String,
    pub approved: String,
    pub error: String,
    pub success: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Ask before deleting listings and folders
    pub confirm_deletes: bool,

    /// Record a view when a listing is opened
    pub track_views: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api/v1".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 9,
            debounce_ms: 500,
            ai_min_term_len: 3,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_descriptions: true,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            ai: "✨".to_string(),
            liked: "♥".to_string(),
            pending: "⏳".to_string(),
            approved: "✔".to_string(),
            error: "❌".to_string(),
            success: "✅".to_string(),
        }
    }
}

impl IconConfig {
    /// Get simple ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            ai: "[AI]".to_string(),
            liked: "<3".to_string(),
            pending: "[P]".to_string(),
            approved: "[OK]".to_string(),
            error: "[X]".to_string(),
            success: "[OK]".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            confirm_deletes: true,
            track_views: true,
        }
    }
}

impl Config {
    /// Load config from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        let mut config = if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            default_config
        } else {
            Self::from_toml(&fs::read_to_string(&config_path)?)?
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;

        // Apply simple mode if glyphs are disabled
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }
        config.search.page_size = config.search.page_size.max(1);

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("stacksift").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# StackSift Configuration File
# Location: ~/.config/stacksift/config.toml (Linux)
#           ~/Library/Application Support/stacksift/config.toml (macOS)
#           %APPDATA%\stacksift\config.toml (Windows)

[api]
# Base URL of the StackSift API, including the version prefix.
# STACKSIFT_API_URL overrides this value.
base_url = "http://localhost:4000/api/v1"

[search]
# Listings per page
page_size = 9

# Milliseconds of quiet before a search request is sent
debounce_ms = 500

# Shortest search term that is topped up with AI suggestions
# when the directory has fewer results than a page holds
ai_min_term_len = 3

[display]
# Use Unicode glyphs for markers; set to false for ASCII-only output
use_glyphs = true

# Show the description column in result tables
show_descriptions = true

[behavior]
# Ask before deleting listings and folders
confirm_deletes = true

# Record a view when a listing is opened with \view
track_views = true
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("StackSift Configuration Setup");
        println!("=============================");

        let mut config = Config::default();

        print!("API base URL [{}]: ", config.api.base_url);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.base_url = input.trim().to_string();
        }

        // Ask about glyph support
        print!("Does your terminal support Unicode icons? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.display.use_glyphs = !input.trim().eq_ignore_ascii_case("n");
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
