use serde::Deserialize;
use std::fs;
use url::Url;

const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";
const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_ATTRIBUTION: &str =
    "Map data &copy; <a href='https://www.openstreetmap.org/'>OpenStreetMap</a> contributors";

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub countries_url: String,
    pub user_agent: Option<String>,
    pub map: MapConfig,
}

/// Tile layer and initial viewport handed to the map widget.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct MapConfig {
    pub tile_url: String,
    pub attribution: String,
    pub subdomains: String,
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            user_agent: None,
            map: MapConfig::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            subdomains: "abc".to_string(),
            center: (0.0, 0.0),
            zoom: 2,
        }
    }
}

impl Config {
    /// Reads `country-map.toml`, then `country-map.example.toml`, and falls back
    /// to the built-in defaults when neither exists.
    pub fn load() -> anyhow::Result<Self> {
        let path = if std::path::Path::new("country-map.toml").exists() {
            "country-map.toml"
        } else if std::path::Path::new("country-map.example.toml").exists() {
            "country-map.example.toml"
        } else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let countries_url = Url::parse(&self.countries_url)
            .map_err(|e| anyhow::anyhow!("invalid countries_url '{}': {}", self.countries_url, e))?;
        if !matches!(countries_url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "countries_url must be http(s), got '{}'",
                self.countries_url
            ));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.map.tile_url.contains(placeholder) {
                return Err(anyhow::anyhow!(
                    "tile_url '{}' is missing the {} placeholder",
                    self.map.tile_url,
                    placeholder
                ));
            }
        }
        if self.map.attribution.trim().is_empty() {
            return Err(anyhow::anyhow!("tile attribution must not be empty"));
        }
        Ok(())
    }
}
