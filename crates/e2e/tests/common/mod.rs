//! Scripted in-memory driver for exercising the helpers without a browser

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use storefront_e2e::driver::{BrowserDriver, ClickOffset};
use storefront_e2e::{E2eError, E2eResult, Locator};

pub const HOME: &str = "https://shop.test/index.php?route=common/home";

/// Answers queries from tables keyed by the locator's display form. URLs
/// follow a timeline relative to creation, so tests can run on a paused
/// tokio clock.
pub struct FakeDriver {
    start: Instant,
    timeline: Mutex<Vec<(Duration, String)>>,
    read_sequence: Mutex<Vec<String>>,
    counts: Mutex<HashMap<String, usize>>,
    click_reveals: Mutex<HashMap<String, String>>,
    click_navigates: Mutex<HashMap<String, String>>,
    evaluations: Mutex<HashMap<String, (usize, Vec<Value>)>>,
    failing_reads: Mutex<HashSet<usize>>,
    events: Mutex<Vec<String>>,
    screenshots: AtomicUsize,
    url_reads: AtomicUsize,
    fail_screenshots: AtomicBool,
}

impl FakeDriver {
    pub fn new(url: &str) -> Self {
        Self {
            start: Instant::now(),
            timeline: Mutex::new(vec![(Duration::ZERO, url.to_string())]),
            read_sequence: Mutex::new(Vec::new()),
            counts: Mutex::new(HashMap::new()),
            click_reveals: Mutex::new(HashMap::new()),
            click_navigates: Mutex::new(HashMap::new()),
            evaluations: Mutex::new(HashMap::new()),
            failing_reads: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
            screenshots: AtomicUsize::new(0),
            url_reads: AtomicUsize::new(0),
            fail_screenshots: AtomicBool::new(false),
        }
    }

    pub fn with_count(self, locator: &Locator, count: usize) -> Self {
        self.set_count(locator, count);
        self
    }

    pub fn set_count(&self, locator: &Locator, count: usize) {
        self.counts.lock().unwrap().insert(locator.to_string(), count);
    }

    /// The URL becomes `url` once `after` has elapsed since creation
    pub fn url_at(self, after: Duration, url: &str) -> Self {
        self.timeline.lock().unwrap().push((after, url.to_string()));
        self
    }

    /// The n-th URL read returns `urls[n]`, the last entry repeating;
    /// overrides the timeline
    pub fn url_reads_as(self, urls: &[&str]) -> Self {
        *self.read_sequence.lock().unwrap() = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// The listed URL reads (0-based) fail as if the page were mid-navigation
    pub fn failing_url_reads(self, reads: impl IntoIterator<Item = usize>) -> Self {
        self.failing_reads.lock().unwrap().extend(reads);
        self
    }

    /// Successive evaluations of `script` return `values` in order, the last
    /// one repeating; other scripts return null
    pub fn on_evaluate(self, script: &str, values: Vec<Value>) -> Self {
        self.evaluations
            .lock()
            .unwrap()
            .insert(script.to_string(), (0, values));
        self
    }

    pub fn clicks_on(&self, locator: &Locator) -> usize {
        let prefix = format!("click:{}@", locator);
        self.events()
            .iter()
            .filter(|e| e.starts_with(&prefix) || **e == format!("click:{}", locator))
            .count()
    }

    pub fn on_click_reveal(self, trigger: &Locator, revealed: &Locator) -> Self {
        self.click_reveals
            .lock()
            .unwrap()
            .insert(trigger.to_string(), revealed.to_string());
        self
    }

    pub fn on_click_navigate(self, target: &Locator, url: &str) -> Self {
        self.click_navigates
            .lock()
            .unwrap()
            .insert(target.to_string(), url.to_string());
        self
    }

    pub fn failing_screenshots(self) -> Self {
        self.fail_screenshots.store(true, Ordering::SeqCst);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn screenshot_attempts(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }

    pub fn url_reads(&self) -> usize {
        self.url_reads.load(Ordering::SeqCst)
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn lookup(&self, locator: &Locator) -> usize {
        self.counts
            .lock()
            .unwrap()
            .get(&locator.to_string())
            .copied()
            .unwrap_or(0)
    }

    fn require(&self, locator: &Locator) -> E2eResult<()> {
        if self.lookup(locator) == 0 {
            return Err(E2eError::ElementNotFound(locator.to_string()));
        }
        Ok(())
    }

    fn go(&self, url: &str) {
        let elapsed = Instant::now() - self.start;
        self.timeline.lock().unwrap().push((elapsed, url.to_string()));
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.record(format!("navigate:{}", url));
        self.go(url);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let read = self.url_reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_reads.lock().unwrap().contains(&read) {
            return Err(E2eError::Driver("Execution context was destroyed".to_string()));
        }
        {
            let sequence = self.read_sequence.lock().unwrap();
            if let Some(last) = sequence.last() {
                return Ok(sequence.get(read).unwrap_or(last).clone());
            }
        }
        let elapsed = Instant::now() - self.start;
        let timeline = self.timeline.lock().unwrap();
        let url = timeline
            .iter()
            .filter(|(at, _)| *at <= elapsed)
            .last()
            .map(|(_, url)| url.clone())
            .unwrap_or_default();
        Ok(url)
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.lookup(locator))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()> {
        self.require(locator)?;
        self.record(format!("scroll:{}", locator));
        Ok(())
    }

    async fn hover(&self, locator: &Locator) -> E2eResult<()> {
        self.require(locator)?;
        self.record(format!("hover:{}", locator));
        Ok(())
    }

    async fn click(&self, locator: &Locator, offset: Option<ClickOffset>) -> E2eResult<()> {
        self.require(locator)?;
        match offset {
            Some(o) => self.record(format!("click:{}@{},{}", locator, o.x, o.y)),
            None => self.record(format!("click:{}", locator)),
        }

        let key = locator.to_string();
        let revealed = self.click_reveals.lock().unwrap().get(&key).cloned();
        if let Some(revealed) = revealed {
            self.counts.lock().unwrap().insert(revealed, 1);
        }
        let target = self.click_navigates.lock().unwrap().get(&key).cloned();
        if let Some(url) = target {
            self.go(&url);
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> E2eResult<Value> {
        self.record(format!("evaluate:{}", script.len()));
        let mut evaluations = self.evaluations.lock().unwrap();
        let value = match evaluations.get_mut(script) {
            Some((calls, values)) => {
                let value = values.get(*calls).or(values.last()).cloned();
                *calls += 1;
                value.unwrap_or(Value::Null)
            }
            None => Value::Null,
        };
        Ok(value)
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        if self.fail_screenshots.load(Ordering::SeqCst) {
            return Err(E2eError::Driver(format!("cannot capture {}", path.display())));
        }
        Ok(())
    }

    async fn maximize_window(&self) -> E2eResult<()> {
        self.record("maximize".to_string());
        Ok(())
    }
}
