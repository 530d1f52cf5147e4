//! The fifteen homepage verification steps
//!
//! Each step is a short sequence of locator lookups and the helpers in
//! [`crate::actions`]. Tolerances are per step: sampling steps pass when at
//! least one of the first few links leads somewhere plausible, and optional
//! widgets (category select, promo row) pass when the theme omits them.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::actions;
use crate::config::{SuiteConfig, Timing};
use crate::driver::BrowserDriver;
use crate::error::{ensure, E2eResult};
use crate::locator::Locator;
use crate::runner::{StepRunner, SuiteReport};

pub const TEST_NAME: &str = "Homepage interactive element checks (15 steps)";

pub const STEP_LABELS: [&str; 15] = [
    "Open the homepage and verify that all main sections (carousel, banners, product categories, and blog preview) load correctly.",
    "Verify that the Shop by Category dropdown expands when clicked.",
    "Click the LambdaTest logo to ensure it redirects to the homepage.",
    "Verify that the Cart opens a side bar with cart view, Wishlist redirects, and My account icon redirects once clicked, and shows options when hovered on the header.",
    "Click the Home, Special, Blog, Mega Menu, and AddOns navigation tabs to confirm correct redirection. Mega Menu and AddOns to open dropdown with further links that redirect to corresponding links.",
    "Test the All Categories dropdown in the search bar and verify options are displayed.",
    "Verify that each Shop Now button on banner ads (carousel and section ads) redirects to valid product/category pages.",
    "Scroll down to Top Trending Categories and verify each image links correctly.",
    "Hover over a Top Product item and confirm quick-action icons (Add to Cart, Wishlist, Compare, Quick View) appear.",
    "Click on any Top Product name or image and verify redirection to the product detail page.",
    "In the Top Collection section, click each tab (Popular, Latest, Best Seller) and verify that product listings update accordingly.",
    "Confirm that all items under the Under @99 or promotional banners are clickable and lead to product pages.",
    "Verify that hovering over product images in collection or promo sections displays action icons consistently.",
    "Scroll to From the Blog and check that both image and title links open the correct blog article.",
    "Click the Scroll-to-Top arrow to ensure it returns the page to the top smoothly.",
];

static SHOP_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)product|category").expect("valid regex"));
static CATEGORY_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)category|path=").expect("valid regex"));
static PRODUCT_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)product").expect("valid regex"));
static BLOG_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)blog|article").expect("valid regex"));

const DROPDOWN: &str = ".dropdown-menu, .menu.dropdown, .dropdown.open .dropdown-menu";
const PRODUCT_CARD: &str = ".product-thumb, .product-layout, .product-grid .product";
const QUICK_ACTIONS: &str = "Add to Cart|Wishlist|Compare|Quick View";

const MAX_SHOP_NOW: usize = 3;
const MAX_CATEGORY_LINKS: usize = 6;
const MAX_COLLECTION_TABS: usize = 3;
const MAX_PROMO_LINKS: usize = 6;
const MAX_HOVER_CARDS: usize = 3;
const MAX_BLOG_LINKS: usize = 3;

fn heading(pattern: &str) -> Locator {
    Locator::visible_css("h2, h3").with_text(pattern)
}

fn quick_action_icons() -> Locator {
    Locator::css("button, a").with_text(QUICK_ACTIONS).visible()
}

/// Elements the sampling steps iterate over
pub mod locators {
    use super::heading;
    use crate::locator::Locator;

    pub fn shop_now_active() -> Locator {
        Locator::css(".swiper-slide-active, .slick-slide.slick-active, .owl-item.active")
            .find("a, button")
            .with_text(r"Shop\s*Now")
            .visible()
    }

    pub fn shop_now_any() -> Locator {
        Locator::css("a, button").with_text(r"Shop\s*Now").visible()
    }

    pub fn trending_header() -> Locator {
        heading("Top Trending Categories")
    }

    pub fn category_links() -> Locator {
        Locator::css("a")
            .visible()
            .with_attribute("href", r"route=product\/category|path=")
    }

    pub fn collection_tabs() -> Locator {
        Locator::css("a, button")
            .with_text("Popular|Latest|Best Seller")
            .visible()
    }

    pub fn product_grid() -> Locator {
        Locator::visible_css(".product-grid, .products, .tab-content .active .product, .grid-holder")
    }

    pub fn promo_header() -> Locator {
        heading(r"Under\s*@?\s*99|Under\s*\$?99|Promo")
    }

    pub fn promo_links() -> Locator {
        Locator::css("a").visible().with_attribute("href", "product|category")
    }

    pub fn blog_header() -> Locator {
        heading("From the Blog")
    }

    pub fn blog_links() -> Locator {
        Locator::visible_css(".blog a, .post a, .article a, .blog-item a, .post-thumb a")
    }

    pub fn scroll_top_button() -> Locator {
        Locator::visible_css(
            r##"a[href="#top"], #back-to-top, .back-to-top, .scroll-top, #scroll-top, .scroll-to-top"##,
        )
    }
}

pub struct HomepageSuite<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a SuiteConfig,
}

impl<'a> HomepageSuite<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, config: &'a SuiteConfig) -> Self {
        Self { driver, config }
    }

    /// Run all fifteen steps in order; failures are collected, never raised
    pub async fn run(&self) -> SuiteReport {
        info!("{}", TEST_NAME);
        let mut runner = StepRunner::new(self.driver, &self.config.screenshot_dir);

        runner.run_step(1, STEP_LABELS[0], self.main_sections()).await;
        runner.run_step(2, STEP_LABELS[1], self.shop_by_category()).await;
        runner.run_step(3, STEP_LABELS[2], self.logo_returns_home()).await;
        runner.run_step(4, STEP_LABELS[3], self.header_widgets()).await;
        runner.run_step(5, STEP_LABELS[4], self.navigation_tabs()).await;
        runner.run_step(6, STEP_LABELS[5], self.search_categories()).await;
        runner.run_step(7, STEP_LABELS[6], self.shop_now_buttons()).await;
        runner.run_step(8, STEP_LABELS[7], self.trending_categories()).await;
        runner.run_step(9, STEP_LABELS[8], self.product_quick_actions()).await;
        runner.run_step(10, STEP_LABELS[9], self.product_detail()).await;
        runner.run_step(11, STEP_LABELS[10], self.collection_tabs()).await;
        runner.run_step(12, STEP_LABELS[11], self.promo_links()).await;
        runner.run_step(13, STEP_LABELS[12], self.hover_consistency()).await;
        runner.run_step(14, STEP_LABELS[13], self.blog_links()).await;
        runner.run_step(15, STEP_LABELS[14], self.scroll_to_top()).await;

        runner.finish()
    }

    fn timing(&self) -> &Timing {
        &self.config.timing
    }

    fn page_ready(&self) -> Locator {
        Locator::visible_css(self.config.ready_selector.as_str())
    }

    async fn exists(&self, locator: &Locator) -> E2eResult<bool> {
        self.driver.exists(locator).await
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        self.driver.count(locator).await
    }

    async fn settled_url(&self) -> E2eResult<String> {
        actions::settled_url(self.driver, self.timing().url_timeout(), self.timing().url_poll())
            .await
    }

    /// Presence assertion with the usual retry window
    async fn expect_present(&self, locator: &Locator, message: &str) -> E2eResult<()> {
        self.expect_within(locator, self.timing().assertion_timeout(), message)
            .await
    }

    async fn expect_within(
        &self,
        locator: &Locator,
        timeout: Duration,
        message: &str,
    ) -> E2eResult<()> {
        actions::expect_exists(self.driver, locator, timeout, self.timing().exists_poll(), message)
            .await
    }

    async fn click_safe(&self, locator: &Locator) -> E2eResult<()> {
        actions::click_safe(self.driver, locator, self.timing()).await
    }

    async fn expect_url(
        &self,
        substrings: &[&str],
        timeout: Duration,
        allow_no_change: bool,
    ) -> E2eResult<()> {
        actions::expect_url_one_of(
            self.driver,
            substrings,
            timeout,
            self.timing().url_poll(),
            allow_no_change,
        )
        .await
    }

    async fn go_home(&self) -> E2eResult<()> {
        self.driver.navigate(&self.config.home_url).await
    }

    async fn return_home(&self) -> E2eResult<()> {
        actions::return_home(self.driver, self.config).await
    }

    async fn any_exists(&self, locators: &[&Locator]) -> E2eResult<bool> {
        for locator in locators {
            if self.exists(locator).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Click `link`; true when the page moved to a URL matching `target`
    async fn click_leads_to(&self, link: &Locator, target: &Regex) -> E2eResult<bool> {
        let before = self.settled_url().await?;
        self.click_safe(link).await?;
        let after = self.settled_url().await?;
        let moved = actions::navigated_to(&before, &after, target);
        debug!("{} -> {} ({})", link, after, if moved { "ok" } else { "no" });
        Ok(moved)
    }

    // Step 1
    async fn main_sections(&self) -> E2eResult<()> {
        let carousel_a = Locator::visible_css("#content .swiper, .swiper-container, .swiper");
        let carousel_b =
            Locator::visible_css(r#".owl-carousel, .slick-slider, [data-ride="carousel"]"#);
        let banners =
            Locator::visible_css(r#".banner a, .home-section .banner a, [class*="banner"] a"#);

        let found_carousel = self.any_exists(&[&carousel_a, &carousel_b]).await?;
        ensure(found_carousel, "Carousel not found")?;
        self.expect_present(&banners, "No banner links visible").await?;
        self.expect_present(
            &locators::trending_header(),
            "\"Top Trending Categories\" missing",
        )
        .await?;
        self.expect_present(&locators::blog_header(), "\"From the Blog\" missing")
            .await
    }

    // Step 2
    async fn shop_by_category(&self) -> E2eResult<()> {
        let trigger = Locator::visible_css("#entry_217825 > button, .navbar-toggler, .dropdown-toggle");
        let dropdown = Locator::visible_css(DROPDOWN);

        self.expect_present(&trigger, "Shop by Category not found").await?;
        actions::hover_or_click_to_open(
            self.driver,
            &trigger,
            &dropdown,
            self.timing().open_timeout(),
            self.timing(),
        )
        .await
    }

    // Step 3
    async fn logo_returns_home(&self) -> E2eResult<()> {
        let logo = Locator::visible_css("#logo a, .navbar-brand");
        self.expect_present(&logo, "Logo not present").await?;
        self.click_safe(&logo).await?;
        self.expect_url(
            &["common/home", "/index.php?route=common/home", "/"],
            self.timing().url_timeout(),
            true,
        )
        .await
    }

    // Step 4
    async fn header_widgets(&self) -> E2eResult<()> {
        self.cart_opens().await?;
        self.wishlist_redirects().await?;
        self.account_menu().await
    }

    async fn cart_opens(&self) -> E2eResult<()> {
        let cart_icon =
            Locator::visible_css(r##"a[href*="route=checkout/cart"], .cart, [data-target="#cart"]"##);
        let cart_panel = Locator::visible_css(
            r#"#cart, .cart-content, .dropdown-menu-cart, .offcanvas, [class*="offcanvas"], .side-cart, .cart-sidebar"#,
        );
        let cart_text = Locator::css("body")
            .with_text("Your shopping cart is empty!")
            .visible();
        let cart_cta = Locator::visible_css("a, button").with_text("Checkout|Edit cart");
        let signals = [&cart_panel, &cart_text, &cart_cta];

        self.expect_present(&cart_icon, "Cart icon missing").await?;
        self.driver.hover(&cart_icon).await?;
        sleep(self.timing().hover_settle()).await;

        if !self.any_exists(&signals).await? {
            self.click_safe(&cart_icon).await?;
            sleep(self.timing().panel_settle()).await;
        }

        // The icon wrapper may be covered; its own button/link usually is not.
        if !self.any_exists(&signals).await? {
            let inner = cart_icon.find("button, a").visible().first();
            if self.exists(&inner).await? {
                self.click_safe(&inner).await?;
                sleep(self.timing().panel_settle()).await;
            }
        }

        ensure(
            self.any_exists(&signals).await?,
            "Cart panel did not open (off-canvas not detected)",
        )
    }

    async fn wishlist_redirects(&self) -> E2eResult<()> {
        let wishlist = Locator::visible_css(r#"a[href*="route=account/wishlist"], .wishlist"#);
        self.expect_present(&wishlist, "Wishlist icon missing").await?;
        self.click_safe(&wishlist).await?;
        // Guests land on the login page
        self.expect_url(
            &["account/wishlist", "account/login"],
            self.timing().url_timeout(),
            true,
        )
        .await?;
        self.return_home().await
    }

    async fn account_menu(&self) -> E2eResult<()> {
        let account_icon =
            Locator::visible_css(r#"a[href*="route=account"], .account, .myaccount, .user, .fa-user"#);
        let account_dropdown = Locator::css(".dropdown-menu")
            .with_text("Register|Login|My Account|Account")
            .visible();

        self.expect_present(&account_icon, "Account icon missing").await?;
        actions::hover_or_click_to_open(
            self.driver,
            &account_icon,
            &account_dropdown,
            self.timing().open_timeout(),
            self.timing(),
        )
        .await?;
        self.click_safe(&account_icon).await?;
        self.expect_url(
            &["account/login", "account/account", "account"],
            self.timing().url_timeout(),
            true,
        )
        .await?;
        self.return_home().await
    }

    // Step 5
    async fn navigation_tabs(&self) -> E2eResult<()> {
        let nav = |pattern: &str| Locator::visible_css("a, .nav-link").with_text(pattern);
        let nav_home = nav("^Home$");
        let nav_special = nav("Special");
        let nav_blog = nav("^Blog$");
        let nav_mega = nav("Mega Menu");
        let nav_addons = nav("AddOns");

        if self.exists(&nav_home).await? {
            self.click_safe(&nav_home).await?;
            self.expect_url(&["common/home", "/"], self.timing().open_timeout(), true)
                .await?;
        }
        if self.exists(&nav_special).await? {
            self.click_safe(&nav_special).await?;
            self.expect_url(
                &["special", "specials", "product/special"],
                self.timing().url_timeout(),
                true,
            )
            .await?;
            self.go_home().await?;
        }
        if self.exists(&nav_blog).await? {
            self.click_safe(&nav_blog).await?;
            self.expect_url(
                &["blog", "extension/maza/blog", "simple_blog"],
                self.timing().url_timeout(),
                true,
            )
            .await?;
            self.go_home().await?;
        }

        for menu in [&nav_mega, &nav_addons] {
            if self.exists(menu).await? {
                self.open_menu_and_follow_first(menu).await?;
            }
        }

        self.expect_within(
            &self.page_ready(),
            self.timing().ready_timeout(),
            "Homepage not visibly ready",
        )
        .await
    }

    async fn open_menu_and_follow_first(&self, menu: &Locator) -> E2eResult<()> {
        let dropdown = Locator::visible_css(DROPDOWN);
        self.driver.hover(menu).await?;
        self.expect_within(
            &dropdown,
            self.timing().open_timeout(),
            &format!("{} did not open a dropdown", menu),
        )
        .await?;

        let first_link = dropdown.find("a").visible().first();
        if self.exists(&first_link).await? {
            self.click_safe(&first_link).await?;
            sleep(self.timing().short_wait()).await;
        }
        self.go_home().await
    }

    // Step 6
    async fn search_categories(&self) -> E2eResult<()> {
        let all_categories = Locator::visible_css(
            r#"select[name="category_id"], .search-category select, .search-by-category select"#,
        );
        if !self.exists(&all_categories).await? {
            // some themes hide it
            return Ok(());
        }
        let options =
            Locator::css(r#"select[name="category_id"] option, .search-category select option"#)
                .visible();
        actions::expect_count_above(
            self.driver,
            &options,
            1,
            self.timing().assertion_timeout(),
            self.timing().exists_poll(),
            "Expected multiple categories",
        )
        .await
    }

    /// Step 7: up to three Shop Now buttons, at least one reaching a
    /// product or category page
    pub async fn shop_now_buttons(&self) -> E2eResult<()> {
        let active = locators::shop_now_active();
        let fallback = locators::shop_now_any();

        let mut found = self.count(&active).await?;
        if found == 0 {
            found = self.count(&fallback).await?;
        }

        let mut success = 0;
        for i in 0..found.min(MAX_SHOP_NOW) {
            // Slides rotate; re-pick the source list on every pass
            let button = if self.count(&active).await? > 0 {
                active.nth(i)
            } else {
                fallback.nth(i)
            };
            if self.click_leads_to(&button, &SHOP_TARGET).await? {
                success += 1;
            }
            self.return_home().await?;
        }

        ensure(success > 0, "No working Shop Now buttons detected")
    }

    /// Step 8: up to six visible category links are tried; links gone
    /// from view are skipped without counting
    pub async fn trending_categories(&self) -> E2eResult<()> {
        let header = locators::trending_header();
        self.expect_present(&header, "\"Top Trending Categories\" missing")
            .await?;
        self.driver.scroll_into_view(&header).await?;

        let links = locators::category_links();
        let found = self.count(&links).await?;
        ensure(found > 0, "No category links found")?;

        let mut good = 0;
        let mut tried = 0;
        for i in 0..found {
            if tried >= MAX_CATEGORY_LINKS {
                break;
            }
            let link = links.nth(i);
            if !self.exists(&link).await? {
                continue;
            }
            if self.click_leads_to(&link, &CATEGORY_TARGET).await? {
                good += 1;
            }
            tried += 1;
            self.return_home().await?;
            self.driver.scroll_into_view(&header).await?;
        }

        ensure(good > 0, "Could not verify any working category links")
    }

    // Step 9
    async fn product_quick_actions(&self) -> E2eResult<()> {
        let card = Locator::visible_css(PRODUCT_CARD);
        self.expect_present(&card, "No product card found").await?;
        self.driver.hover(&card.first()).await?;
        self.expect_within(
            &quick_action_icons(),
            self.timing().reveal_timeout(),
            "Quick-action icons did not appear",
        )
        .await
    }

    // Step 10
    async fn product_detail(&self) -> E2eResult<()> {
        let link = Locator::visible_css(".product-thumb a, .product-layout a, .caption a, .name a, .title a");
        self.expect_present(&link, "No product link found").await?;
        let opened = self.click_leads_to(&link.first(), &PRODUCT_TARGET).await?;
        ensure(opened, "Product detail did not open")?;
        self.return_home().await
    }

    /// Step 11: a tab click counts when the URL changed or a product grid
    /// is showing
    pub async fn collection_tabs(&self) -> E2eResult<()> {
        let tab = locators::collection_tabs();
        let grid = locators::product_grid();

        self.driver.scroll_into_view(&tab.first()).await?;
        self.expect_present(&tab, "Collection tabs not found").await?;

        let mut changed = 0;
        let to_check = self.count(&tab).await?.min(MAX_COLLECTION_TABS);
        let mut previous = self.settled_url().await?;
        for i in 0..to_check {
            self.click_safe(&tab.nth(i)).await?;
            let now = self.settled_url().await?;
            if now != previous || self.exists(&grid).await? {
                changed += 1;
            }
            previous = now;
        }

        ensure(changed > 0, "No tab change detected")
    }

    /// Step 12: passes when the promo row is absent. Otherwise up to six
    /// links are tried and the first one reaching a product or category
    /// page ends the step. Every attempt, the successful one included,
    /// goes back to the start page so step 13 begins from home.
    pub async fn promo_links(&self) -> E2eResult<()> {
        let header = locators::promo_header();
        if !self.exists(&header).await? {
            return Ok(());
        }
        self.driver.scroll_into_view(&header).await?;

        let links = locators::promo_links();
        let found = self.count(&links).await?;
        ensure(found > 0, "No promo links found")?;

        let mut good = false;
        for i in 0..found.min(MAX_PROMO_LINKS) {
            let moved = self.click_leads_to(&links.nth(i), &SHOP_TARGET).await?;
            self.return_home().await?;
            if moved {
                good = true;
                break;
            }
            self.driver.scroll_into_view(&header).await?;
        }

        ensure(good, "No working promo link detected")
    }

    // Step 13
    async fn hover_consistency(&self) -> E2eResult<()> {
        let card = Locator::visible_css(PRODUCT_CARD);
        self.expect_present(&card, "No product card found").await?;

        let icons = quick_action_icons();
        let mut good = 0;
        let cards = self.count(&card).await?.min(MAX_HOVER_CARDS);
        for i in 0..cards {
            self.driver.hover(&card.nth(i)).await?;
            if self.exists(&icons).await? {
                good += 1;
            }
        }

        ensure(good > 0, "No quick-action icons visible on hover")
    }

    /// Step 14: passes when the section has no links. Otherwise up to
    /// three are tried, the first blog or article URL ending the step; like
    /// step 12 each attempt returns to the start page, success included.
    pub async fn blog_links(&self) -> E2eResult<()> {
        let header = locators::blog_header();
        self.expect_present(&header, "\"From the Blog\" section missing")
            .await?;
        self.driver.scroll_into_view(&header).await?;

        let links = locators::blog_links();
        let found = self.count(&links).await?;
        if found == 0 {
            return Ok(());
        }

        let mut opened = false;
        for i in 0..found.min(MAX_BLOG_LINKS) {
            let moved = self.click_leads_to(&links.nth(i), &BLOG_TARGET).await?;
            self.return_home().await?;
            if moved {
                opened = true;
                break;
            }
            self.driver.scroll_into_view(&header).await?;
        }

        ensure(opened, "Could not open any blog article link")
    }

    /// Step 15: after the arrow click the offset must drop below 120px or
    /// at least below where it was
    pub async fn scroll_to_top(&self) -> E2eResult<()> {
        self.driver
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        sleep(self.timing().short_wait()).await;

        let top_button = locators::scroll_top_button();
        self.expect_present(&top_button, "Scroll-to-Top button not present")
            .await?;

        let before_y = actions::scroll_y(self.driver).await?;
        self.click_safe(&top_button).await?;
        let at_top = actions::wait_for_scroll_top(self.driver, before_y, self.timing()).await?;
        ensure(at_top, "Did not scroll towards top")
    }
}
