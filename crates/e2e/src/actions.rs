//! Tolerant interaction helpers shared by every verification step
//!
//! The demo storefront is a third-party page with overlays, slide-in
//! animations and routes that sometimes resolve to the page already shown.
//! These helpers absorb that noise so a step can state what it expects
//! without racing the page.

use std::time::Duration;

use regex::Regex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::{SuiteConfig, Timing};
use crate::driver::{BrowserDriver, ClickOffset};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Scroll into view, hover, click near the top-left corner, then pause.
///
/// Clicking off-centre keeps overlays that sit on the middle of a card
/// (quick-view buttons, sale badges) from swallowing the click.
pub async fn click_safe(
    driver: &dyn BrowserDriver,
    target: &Locator,
    timing: &Timing,
) -> E2eResult<()> {
    driver.scroll_into_view(target).await?;
    driver.hover(target).await?;
    let offset = ClickOffset {
        x: timing.click_offset_x,
        y: timing.click_offset_y,
    };
    driver.click(target, Some(offset)).await?;
    sleep(timing.short_wait()).await;
    Ok(())
}

/// Poll until `target` matches, failing with `message` after `timeout`
pub async fn expect_exists(
    driver: &dyn BrowserDriver,
    target: &Locator,
    timeout: Duration,
    poll: Duration,
    message: &str,
) -> E2eResult<()> {
    expect_count_above(driver, target, 0, timeout, poll, message).await
}

/// Poll until `target` has more than `min` matches
pub async fn expect_count_above(
    driver: &dyn BrowserDriver,
    target: &Locator,
    min: usize,
    timeout: Duration,
    poll: Duration,
    message: &str,
) -> E2eResult<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if driver.count(target).await? > min {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(E2eError::assertion(message));
        }
        sleep(poll).await;
    }
}

/// Hover `trigger`; when that alone does not reveal `revealed`, safe-click
/// it. Either way `revealed` must show up within `timeout`.
pub async fn hover_or_click_to_open(
    driver: &dyn BrowserDriver,
    trigger: &Locator,
    revealed: &Locator,
    timeout: Duration,
    timing: &Timing,
) -> E2eResult<()> {
    driver.hover(trigger).await?;
    if !driver.exists(revealed).await? {
        debug!("Hover did not reveal {}, clicking {}", revealed, trigger);
        click_safe(driver, trigger, timing).await?;
    }
    expect_exists(
        driver,
        revealed,
        timeout,
        timing.exists_poll(),
        &format!("{} did not open", revealed),
    )
    .await
}

/// Poll the URL until it contains one of `substrings`.
///
/// An empty set means "any change from the URL read on entry". Succeeds on
/// the first match. When nothing matched by `timeout` but the entry URL
/// already satisfied one of the substrings and `allow_no_change` is set,
/// the navigation is taken as a no-op onto an acceptable page. Otherwise
/// fails with [`E2eError::UrlMismatch`], never before `timeout` elapsed.
///
/// A read that fails while the page is navigating counts as "not matched
/// yet". When no read succeeds at all, the last read error is returned.
pub async fn expect_url_one_of(
    driver: &dyn BrowserDriver,
    substrings: &[&str],
    timeout: Duration,
    poll: Duration,
    allow_no_change: bool,
) -> E2eResult<()> {
    let deadline = Instant::now() + timeout;
    let mut last_error = None;
    let mut before = match driver.current_url().await {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("URL unreadable on entry: {}", e);
            last_error = Some(e);
            None
        }
    };
    let mut last_seen = before.clone();

    while Instant::now() < deadline {
        match driver.current_url().await {
            Ok(now) => {
                // Without an entry read the first readable URL is the baseline
                let baseline = before.get_or_insert_with(|| now.clone());
                let matched = if substrings.is_empty() {
                    now != *baseline
                } else {
                    contains_any(&now, substrings)
                };
                if matched {
                    debug!("URL matched: {}", now);
                    return Ok(());
                }
                last_seen = Some(now);
            }
            Err(e) => {
                debug!("URL read failed, still polling: {}", e);
                last_error = Some(e);
            }
        }
        sleep(poll).await;
    }

    if allow_no_change {
        if let Some(before) = &before {
            if contains_any(before, substrings) {
                debug!("URL never changed but {} was already acceptable", before);
                return Ok(());
            }
        }
    }

    match (last_seen, last_error) {
        (None, Some(e)) => Err(e),
        (actual, _) => Err(E2eError::UrlMismatch {
            expected: substrings.iter().map(|s| s.to_string()).collect(),
            actual: actual.unwrap_or_default(),
        }),
    }
}

/// Read the URL, retrying reads that fail mid-navigation until `timeout`
pub async fn settled_url(
    driver: &dyn BrowserDriver,
    timeout: Duration,
    poll: Duration,
) -> E2eResult<String> {
    let deadline = Instant::now() + timeout;
    loop {
        match driver.current_url().await {
            Ok(url) => return Ok(url),
            Err(e) if Instant::now() < deadline => {
                debug!("URL read failed, retrying: {}", e);
                sleep(poll).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn contains_any(url: &str, substrings: &[&str]) -> bool {
    substrings.iter().any(|s| url.contains(s))
}

/// True when the page left `before` for a URL matching `pattern`
pub fn navigated_to(before: &str, after: &str, pattern: &Regex) -> bool {
    after != before && pattern.is_match(after)
}

pub const SCROLL_Y_SCRIPT: &str = "window.pageYOffset || document.documentElement.scrollTop || 0";

/// Current vertical scroll offset of the page
pub async fn scroll_y(driver: &dyn BrowserDriver) -> E2eResult<f64> {
    let value = driver.evaluate(SCROLL_Y_SCRIPT).await?;
    value
        .as_f64()
        .ok_or_else(|| E2eError::Driver(format!("scroll offset returned {}", value)))
}

/// Wait for the page to come back near the top, or at least above `before_y`
pub async fn wait_for_scroll_top(
    driver: &dyn BrowserDriver,
    before_y: f64,
    timing: &Timing,
) -> E2eResult<bool> {
    let deadline = Instant::now() + timing.scroll_timeout();
    while Instant::now() < deadline {
        sleep(timing.scroll_poll()).await;
        let y = scroll_y(driver).await?;
        if y < 120.0 || y < before_y {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Navigate back to the start page and wait until it is usable
pub async fn return_home(driver: &dyn BrowserDriver, config: &SuiteConfig) -> E2eResult<()> {
    driver.navigate(&config.home_url).await?;
    expect_exists(
        driver,
        &Locator::visible_css(config.ready_selector.as_str()),
        config.timing.ready_timeout(),
        config.timing.exists_poll(),
        "Homepage not visibly ready",
    )
    .await
}
