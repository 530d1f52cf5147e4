//! Timing properties of the interaction helpers, checked on a paused clock

mod common;

use std::time::Duration;

use test_case::test_case;
use tokio::time::Instant;

use common::{FakeDriver, HOME};
use serde_json::json;
use storefront_e2e::actions::{
    click_safe, expect_exists, expect_url_one_of, hover_or_click_to_open, scroll_y, settled_url,
    SCROLL_Y_SCRIPT,
};
use storefront_e2e::config::Timing;
use storefront_e2e::{E2eError, Fixture, Locator, SuiteConfig};

const LOGIN: &str = "https://shop.test/index.php?route=account/login";
const CONTACT: &str = "https://shop.test/index.php?route=information/contact";
const TIMEOUT: Duration = Duration::from_secs(8);
const POLL: Duration = Duration::from_millis(200);

#[test_case(Duration::ZERO ; "already there")]
#[test_case(Duration::from_millis(900) ; "after a redirect")]
#[test_case(Duration::from_millis(7_800) ; "just before the deadline")]
#[tokio::test(start_paused = true)]
async fn test_url_match_resolves_before_timeout(redirect_after: Duration) {
    let driver = FakeDriver::new(HOME).url_at(redirect_after, LOGIN);
    let start = Instant::now();

    expect_url_one_of(&driver, &["account/wishlist", "account/login"], TIMEOUT, POLL, true)
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed < TIMEOUT, "took {:?}", elapsed);
    assert!(elapsed >= redirect_after);
}

#[tokio::test(start_paused = true)]
async fn test_url_match_no_op_navigation_on_acceptable_page() {
    let driver = FakeDriver::new(HOME);

    expect_url_one_of(&driver, &["common/home", "/"], TIMEOUT, POLL, true)
        .await
        .unwrap();
}

#[test_case(true ; "tolerated")]
#[test_case(false ; "strict")]
#[tokio::test(start_paused = true)]
async fn test_url_match_falls_back_to_entry_url(allow_no_change: bool) {
    // Entry URL was acceptable, the page then wandered somewhere else
    let driver = FakeDriver::new(HOME).url_reads_as(&[HOME, CONTACT]);
    let start = Instant::now();

    let result = expect_url_one_of(&driver, &["common/home"], TIMEOUT, POLL, allow_no_change).await;

    assert!(start.elapsed() >= TIMEOUT);
    assert_eq!(result.is_ok(), allow_no_change);
}

#[tokio::test(start_paused = true)]
async fn test_url_match_fails_only_after_full_timeout() {
    let driver = FakeDriver::new(HOME);
    let start = Instant::now();

    let err = expect_url_one_of(&driver, &["product/special", "specials"], TIMEOUT, POLL, true)
        .await
        .unwrap_err();

    assert!(start.elapsed() >= TIMEOUT);
    match err {
        E2eError::UrlMismatch { expected, actual } => {
            assert_eq!(expected, vec!["product/special", "specials"]);
            assert_eq!(actual, HOME);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // polled repeatedly rather than once at the end
    assert!(driver.url_reads() > 10);
}

#[tokio::test(start_paused = true)]
async fn test_url_match_empty_set_means_any_change() {
    let moving = FakeDriver::new(HOME).url_at(Duration::from_secs(1), CONTACT);
    expect_url_one_of(&moving, &[], TIMEOUT, POLL, true).await.unwrap();

    let still = FakeDriver::new(HOME);
    let start = Instant::now();
    assert!(expect_url_one_of(&still, &[], TIMEOUT, POLL, true).await.is_err());
    assert!(start.elapsed() >= TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_click_safe_scrolls_hovers_then_clicks_off_centre() {
    let logo = Locator::visible_css("#logo a, .navbar-brand");
    let driver = FakeDriver::new(HOME).with_count(&logo, 1);
    let timing = Timing::default();
    let start = Instant::now();

    click_safe(&driver, &logo, &timing).await.unwrap();

    assert_eq!(
        driver.events(),
        vec![
            format!("scroll:{}", logo),
            format!("hover:{}", logo),
            format!("click:{}@10,10", logo),
        ]
    );
    assert!(start.elapsed() >= timing.short_wait());
}

#[tokio::test(start_paused = true)]
async fn test_click_safe_missing_element() {
    let driver = FakeDriver::new(HOME);
    let err = click_safe(&driver, &Locator::css("#nope"), &Timing::default())
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_hover_or_click_falls_back_to_click() {
    let trigger = Locator::visible_css(".dropdown-toggle");
    let menu = Locator::visible_css(".dropdown-menu");
    let driver = FakeDriver::new(HOME)
        .with_count(&trigger, 1)
        .on_click_reveal(&trigger, &menu);
    let timing = Timing::default();

    hover_or_click_to_open(&driver, &trigger, &menu, timing.open_timeout(), &timing)
        .await
        .unwrap();

    let events = driver.events();
    assert_eq!(events[0], format!("hover:{}", trigger));
    assert!(events.iter().any(|e| e.starts_with("click:")));
}

#[tokio::test(start_paused = true)]
async fn test_hover_alone_is_enough() {
    let trigger = Locator::visible_css(".dropdown-toggle");
    let menu = Locator::visible_css(".dropdown-menu");
    let driver = FakeDriver::new(HOME)
        .with_count(&trigger, 1)
        .with_count(&menu, 1);
    let timing = Timing::default();

    hover_or_click_to_open(&driver, &trigger, &menu, timing.open_timeout(), &timing)
        .await
        .unwrap();

    assert!(driver.events().iter().all(|e| !e.starts_with("click:")));
}

#[tokio::test(start_paused = true)]
async fn test_hover_or_click_times_out() {
    let trigger = Locator::visible_css(".dropdown-toggle");
    let menu = Locator::visible_css(".dropdown-menu");
    let driver = FakeDriver::new(HOME).with_count(&trigger, 1);
    let timing = Timing::default();
    let start = Instant::now();

    let err = hover_or_click_to_open(&driver, &trigger, &menu, timing.open_timeout(), &timing)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::AssertionFailed(_)));
    assert!(start.elapsed() >= timing.open_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_expect_exists_waits_for_late_element() {
    let driver = FakeDriver::new(HOME);
    let banner = Locator::visible_css(".banner a");
    let start = Instant::now();

    let res = expect_exists(&driver, &banner, Duration::from_secs(3), POLL, "No banner links visible").await;
    match res {
        Err(E2eError::AssertionFailed(msg)) => assert_eq!(msg, "No banner links visible"),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(start.elapsed() >= Duration::from_secs(3));

    driver.set_count(&banner, 4);
    expect_exists(&driver, &banner, Duration::from_secs(3), POLL, "No banner links visible")
        .await
        .unwrap();
}

fn fixture_config() -> SuiteConfig {
    SuiteConfig {
        home_url: HOME.to_string(),
        ..SuiteConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_before_each_opens_ready_home() {
    let config = fixture_config();
    let driver = FakeDriver::new("about:blank")
        .with_count(&Locator::visible_css(config.ready_selector.as_str()), 1);

    Fixture::new(&config).before_each(&driver).await.unwrap();

    let events = driver.events();
    assert_eq!(events[0], "maximize");
    assert_eq!(events[1], format!("navigate:{}", HOME));
}

#[tokio::test(start_paused = true)]
async fn test_before_each_rejects_page_that_never_renders() {
    let config = fixture_config();
    let driver = FakeDriver::new("about:blank");
    let start = Instant::now();

    let err = Fixture::new(&config).before_each(&driver).await.unwrap_err();

    assert_eq!(err.to_string(), "Assertion failed: Homepage not visibly ready");
    assert!(start.elapsed() >= config.timing.ready_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_before_each_requires_home_route() {
    let config = SuiteConfig {
        home_url: "https://shop.test/index.php?route=information/sitemap".to_string(),
        ..SuiteConfig::default()
    };
    let driver = FakeDriver::new("about:blank")
        .with_count(&Locator::visible_css(config.ready_selector.as_str()), 1);

    let err = Fixture::new(&config).before_each(&driver).await.unwrap_err();

    assert!(matches!(err, E2eError::UrlMismatch { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_url_read_during_navigation_keeps_polling() {
    let driver = FakeDriver::new(HOME)
        .url_at(Duration::from_millis(600), LOGIN)
        .failing_url_reads([1]);
    let start = Instant::now();

    expect_url_one_of(&driver, &["account/login"], TIMEOUT, POLL, true)
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(600));
    assert!(start.elapsed() < TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_entry_url_uses_first_read_as_baseline() {
    let driver = FakeDriver::new(HOME)
        .url_at(Duration::from_millis(1_000), CONTACT)
        .failing_url_reads([0]);

    expect_url_one_of(&driver, &[], TIMEOUT, POLL, false).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_url_never_readable_reports_read_error() {
    let driver = FakeDriver::new(HOME).failing_url_reads(0..1_000);
    let start = Instant::now();

    let err = expect_url_one_of(&driver, &["account/login"], TIMEOUT, POLL, true)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Driver(_)), "{:?}", err);
    assert!(start.elapsed() >= TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_settled_url_retries_failed_reads() {
    let driver = FakeDriver::new(LOGIN).failing_url_reads(0..3);

    let url = settled_url(&driver, TIMEOUT, POLL).await.unwrap();

    assert_eq!(url, LOGIN);
    assert_eq!(driver.url_reads(), 4);
}

#[tokio::test]
async fn test_scroll_offset_must_be_numeric() {
    let driver = FakeDriver::new(HOME).on_evaluate(SCROLL_Y_SCRIPT, vec![json!("oops")]);
    let err = scroll_y(&driver).await.unwrap_err();
    assert!(matches!(err, E2eError::Driver(_)));

    let driver = FakeDriver::new(HOME).on_evaluate(SCROLL_Y_SCRIPT, vec![json!(2400)]);
    assert_eq!(scroll_y(&driver).await.unwrap(), 2400.0);
}
