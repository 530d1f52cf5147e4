//! Test fixture: one start page and the readiness check run before the case

use tracing::{info, warn};

use crate::actions::{expect_exists, expect_url_one_of};
use crate::config::SuiteConfig;
use crate::driver::{BrowserDriver, ChromeDriver};
use crate::error::E2eResult;
use crate::locator::Locator;

pub struct Fixture<'a> {
    config: &'a SuiteConfig,
}

impl<'a> Fixture<'a> {
    pub fn new(config: &'a SuiteConfig) -> Self {
        Self { config }
    }

    /// Launch the browser described by the config
    pub async fn launch(&self) -> E2eResult<ChromeDriver> {
        self.config.validate()?;
        ChromeDriver::launch(&self.config.browser).await
    }

    /// Open the start page and wait until it is ready. Any error here fails
    /// the whole test case.
    pub async fn before_each(&self, driver: &dyn BrowserDriver) -> E2eResult<()> {
        let timing = &self.config.timing;

        if let Err(e) = driver.maximize_window().await {
            warn!("Could not maximize window: {}", e);
        }

        info!("Opening {}", self.config.home_url);
        driver.navigate(&self.config.home_url).await?;

        expect_exists(
            driver,
            &Locator::visible_css(self.config.ready_selector.as_str()),
            timing.ready_timeout(),
            timing.exists_poll(),
            "Homepage not visibly ready",
        )
        .await?;

        expect_url_one_of(
            driver,
            &[self.config.home_route.as_str()],
            timing.route_timeout(),
            timing.url_poll(),
            false,
        )
        .await
    }
}
