//! Browser driver seam and its Chrome DevTools implementation

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::layout::Point;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserSettings;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Click position relative to an element's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOffset {
    pub x: f64,
    pub y: f64,
}

/// Viewport-relative bounding box of an element
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Point at `offset` from the top-left corner, clamped inside the box
    pub fn offset(&self, offset: ClickOffset) -> (f64, f64) {
        let dx = offset.x.clamp(0.0, self.width.max(0.0));
        let dy = offset.y.clamp(0.0, self.height.max(0.0));
        (self.x + dx, self.y + dy)
    }
}

/// Everything the helpers need from a browser. Element-level calls act on
/// the first match of the locator.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    async fn exists(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(self.count(locator).await? > 0)
    }

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()>;

    /// Move the mouse to the element centre
    async fn hover(&self, locator: &Locator) -> E2eResult<()>;

    /// Click at `offset` from the top-left corner, or the centre when `None`
    async fn click(&self, locator: &Locator, offset: Option<ClickOffset>) -> E2eResult<()>;

    async fn evaluate(&self, script: &str) -> E2eResult<Value>;

    async fn screenshot(&self, path: &Path) -> E2eResult<()>;

    async fn maximize_window(&self) -> E2eResult<()>;
}

/// Chrome/Chromium driven over CDP
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromeDriver {
    /// Launch a browser and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> E2eResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .viewport(None::<Viewport>)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| E2eError::BrowserLaunch(format!("invalid browser config: {}", e)))?;

        info!(
            "Launching Chrome ({}x{}, headless: {})",
            settings.window_width, settings.window_height, settings.headless
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| E2eError::BrowserLaunch(e.to_string()))?;

        // The CDP connection stalls unless its event stream is drained.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: settings.navigation_timeout(),
        })
    }

    /// Shut the browser down
    pub async fn close(mut self) -> E2eResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Error waiting for browser exit: {}", e);
        }
        self.handler.abort();
        Ok(())
    }

    /// Scroll the first match into view and return its rect
    async fn target(&self, locator: &Locator) -> E2eResult<ElementRect> {
        let value = self.evaluate(&locator.target_script()).await?;
        if value.is_null() {
            return Err(E2eError::ElementNotFound(locator.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, E2eError>(())
        };
        tokio::time::timeout(self.navigation_timeout, load)
            .await
            .map_err(|_| E2eError::Timeout(format!("navigation to {}", url)))?
    }

    async fn current_url(&self) -> E2eResult<String> {
        // location.href reflects hash and pushState changes immediately
        match self.evaluate("window.location.href").await? {
            Value::String(href) => Ok(href),
            _ => Ok(self.page.url().await?.unwrap_or_default()),
        }
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self.evaluate(&locator.count_script()).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Driver(format!("count of {} returned {}", locator, value)))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()> {
        self.target(locator).await.map(|_| ())
    }

    async fn hover(&self, locator: &Locator) -> E2eResult<()> {
        let rect = self.target(locator).await?;
        let (x, y) = rect.center();
        self.page.move_mouse(Point { x, y }).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator, offset: Option<ClickOffset>) -> E2eResult<()> {
        let rect = self.target(locator).await?;
        let (x, y) = match offset {
            Some(offset) => rect.offset(offset),
            None => rect.center(),
        };
        debug!("Clicking {} at ({:.0}, {:.0})", locator, x, y);
        self.page.click(Point { x, y }).await?;

        // Let a navigation started by the click finish loading; clicks that
        // stay on the page resolve immediately.
        match tokio::time::timeout(self.navigation_timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("Waiting for navigation after click failed: {}", e),
            Err(_) => warn!(
                "Navigation after clicking {} still loading after {:?}",
                locator, self.navigation_timeout
            ),
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> E2eResult<Value> {
        // Runtime.evaluate with by-value results; locator scripts return
        // plain objects
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(E2eError::Driver)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        self.page
            .save_screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
                path,
            )
            .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> E2eResult<()> {
        let window = self
            .page
            .execute(GetWindowForTargetParams::default())
            .await?;
        let bounds = Bounds::builder().window_state(WindowState::Maximized).build();
        self.page
            .execute(SetWindowBoundsParams::new(window.window_id.clone(), bounds))
            .await?;
        Ok(())
    }
}
