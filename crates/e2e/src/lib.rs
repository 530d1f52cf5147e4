//! Storefront homepage E2E checks
//!
//! This crate drives a real Chrome against the storefront demo homepage and
//! walks fifteen UI checks, one after another:
//! - Launches Chrome over the DevTools protocol
//! - Resolves declarative locators inside the page
//! - Interacts through overlay-tolerant helpers (safe click, hover-or-click,
//!   tolerant URL match)
//! - Counts and screenshots failing steps without stopping the run
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  homepage test binary                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fixture                                                    │
//! │    ├── launch() -> ChromeDriver                             │
//! │    └── before_each(): maximize, open start URL, ready check │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HomepageSuite::run() -> SuiteReport                        │
//! │    └── StepRunner::run_step(n, label, step)   x15           │
//! │          └── actions: click_safe, hover_or_click_to_open,   │
//! │                       expect_url_one_of, expect_exists      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver (trait)                                      │
//! │    └── ChromeDriver (chromiumoxide)  Locator -> JS          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod homepage;
pub mod locator;
pub mod runner;

pub use config::SuiteConfig;
pub use driver::{BrowserDriver, ChromeDriver};
pub use error::{E2eError, E2eResult};
pub use fixture::Fixture;
pub use homepage::HomepageSuite;
pub use locator::Locator;
pub use runner::{StepRunner, SuiteReport};
