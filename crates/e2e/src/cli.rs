//! Command line of the homepage test binary

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::Parser;

use crate::config::SuiteConfig;
use crate::error::E2eResult;

#[derive(Parser, Debug)]
#[command(name = "storefront-e2e")]
#[command(about = "Homepage functional verification for the storefront demo")]
pub struct Args {
    /// Actually launch the browser (otherwise the case is skipped)
    #[arg(long, env = "STOREFRONT_E2E", value_parser = FalseyValueParser::new())]
    pub enable: bool,

    /// YAML config file; flags below override it
    #[arg(short, long, env = "STOREFRONT_E2E_CONFIG")]
    pub config: Option<PathBuf>,

    /// Start URL
    #[arg(long, env = "STOREFRONT_E2E_HOME_URL")]
    pub home_url: Option<String>,

    /// Directory for failure screenshots
    #[arg(long, env = "STOREFRONT_E2E_SCREENSHOTS")]
    pub screenshots: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chrome/Chromium executable
    #[arg(long, env = "CHROME")]
    pub chrome: Option<PathBuf>,

    /// Disable the Chrome sandbox (containers running as root)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Exit non-zero when any step failed
    #[arg(long)]
    pub strict: bool,

    /// Filters and flags `cargo test` forwards to every test binary
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub libtest: Vec<String>,
}

impl Args {
    /// Config file (or defaults) with the command line applied on top
    pub fn load_config(&self) -> E2eResult<SuiteConfig> {
        let mut config = match &self.config {
            Some(path) => SuiteConfig::from_file(path)?,
            None => SuiteConfig::default(),
        };

        if let Some(url) = &self.home_url {
            config.home_url = url.clone();
        }
        if let Some(dir) = &self.screenshots {
            config.screenshot_dir = dir.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(chrome) = &self.chrome {
            config.browser.chrome_executable = Some(chrome.clone());
        }
        if self.no_sandbox {
            config.browser.no_sandbox = true;
        }

        config.validate()?;
        Ok(config)
    }
}
