//! Suite configuration, loadable from YAML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_HOME_URL: &str =
    "https://ecommerce-playground.lambdatest.io/index.php?route=common/home";

/// Everything the homepage suite needs to know about where and how to run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Start URL opened before the test case
    pub home_url: String,

    /// Substring the start URL must contain once the page is ready
    pub home_route: String,

    /// Any visible match means the page is ready for interaction
    pub ready_selector: String,

    /// Where failure screenshots land
    pub screenshot_dir: PathBuf,

    pub browser: BrowserSettings,

    pub timing: Timing,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            home_route: "route=common/home".to_string(),
            ready_selector: "#logo a, .navbar-brand, header .navbar, header, .navbar".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            browser: BrowserSettings::default(),
            timing: Timing::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Chrome/Chromium binary; autodetected when unset
    pub chrome_executable: Option<PathBuf>,
    /// Needed when running as root inside containers
    pub no_sandbox: bool,
    /// Upper bound on a page load, after `navigate` or a navigating click
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_executable: None,
            no_sandbox: false,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// Waits, polls and timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Pause after every safe click
    pub short_wait_ms: u64,
    pub url_poll_ms: u64,
    pub url_timeout_ms: u64,
    /// How long a hover/click may take to reveal a dropdown, and the
    /// redirect window of the Home tab
    pub open_timeout_ms: u64,
    /// Retry window of presence/count assertions
    pub assertion_timeout_ms: u64,
    /// Quick-action icons appearing on a hovered product card
    pub reveal_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    pub route_timeout_ms: u64,
    pub exists_poll_ms: u64,
    pub scroll_poll_ms: u64,
    pub scroll_timeout_ms: u64,
    /// Slide-in animation of the cart panel
    pub panel_settle_ms: u64,
    pub hover_settle_ms: u64,
    pub click_offset_x: f64,
    pub click_offset_y: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            short_wait_ms: 300,
            url_poll_ms: 200,
            url_timeout_ms: 8000,
            open_timeout_ms: 6000,
            assertion_timeout_ms: 3000,
            reveal_timeout_ms: 5000,
            ready_timeout_ms: 10_000,
            route_timeout_ms: 5000,
            exists_poll_ms: 100,
            scroll_poll_ms: 150,
            scroll_timeout_ms: 5000,
            panel_settle_ms: 800,
            hover_settle_ms: 200,
            click_offset_x: 10.0,
            click_offset_y: 10.0,
        }
    }
}

impl Timing {
    pub fn short_wait(&self) -> Duration {
        Duration::from_millis(self.short_wait_ms)
    }

    pub fn url_poll(&self) -> Duration {
        Duration::from_millis(self.url_poll_ms)
    }

    pub fn url_timeout(&self) -> Duration {
        Duration::from_millis(self.url_timeout_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    pub fn reveal_timeout(&self) -> Duration {
        Duration::from_millis(self.reveal_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms)
    }

    pub fn exists_poll(&self) -> Duration {
        Duration::from_millis(self.exists_poll_ms)
    }

    pub fn scroll_poll(&self) -> Duration {
        Duration::from_millis(self.scroll_poll_ms)
    }

    pub fn scroll_timeout(&self) -> Duration {
        Duration::from_millis(self.scroll_timeout_ms)
    }

    pub fn panel_settle(&self) -> Duration {
        Duration::from_millis(self.panel_settle_ms)
    }

    pub fn hover_settle(&self) -> Duration {
        Duration::from_millis(self.hover_settle_ms)
    }
}

impl SuiteConfig {
    /// Parse a config from a YAML string; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        let parsed = url::Url::parse(&self.home_url).map_err(|e| {
            E2eError::InvalidConfig(format!("home_url '{}': {}", self.home_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(E2eError::InvalidConfig(format!(
                "home_url must be http(s), got '{}'",
                parsed.scheme()
            )));
        }
        if self.home_route.trim().is_empty() {
            return Err(E2eError::InvalidConfig("home_route is empty".to_string()));
        }
        if self.ready_selector.trim().is_empty() {
            return Err(E2eError::InvalidConfig("ready_selector is empty".to_string()));
        }
        Ok(())
    }
}
