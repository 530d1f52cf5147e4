//! Step runner: counts failures, screenshots them, never stops the run

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::driver::BrowserDriver;
use crate::error::E2eResult;

/// Outcome of a single verification step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub number: u32,
    pub label: String,
    pub passed: bool,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Everything the run produced, returned to the caller instead of living in
/// a process-wide counter
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub steps: Vec<StepOutcome>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn failed(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed).count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }

    /// Final console line
    pub fn summary_line(&self) -> String {
        match self.failed() {
            0 => "\n0 failed test cases".to_string(),
            n => format!(
                "\n{} failed test cases. Check screenshots folder for manual checks",
                n
            ),
        }
    }
}

/// Runs steps in order against one driver
pub struct StepRunner<'a> {
    driver: &'a dyn BrowserDriver,
    screenshot_dir: PathBuf,
    report: SuiteReport,
}

impl<'a> StepRunner<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, screenshot_dir: impl AsRef<Path>) -> Self {
        Self {
            driver,
            screenshot_dir: screenshot_dir.as_ref().to_path_buf(),
            report: SuiteReport::default(),
        }
    }

    /// Await `step`. A failure is counted, printed and screenshotted; it is
    /// never returned, so the next step always runs.
    pub async fn run_step<F>(&mut self, number: u32, label: &str, step: F) -> bool
    where
        F: Future<Output = E2eResult<()>>,
    {
        debug!("Running step {}", number);

        let outcome = match step.await {
            Ok(()) => {
                println!("Step {}; {}; PASS", number, label);
                StepOutcome {
                    number,
                    label: label.to_string(),
                    passed: true,
                    error: None,
                    screenshot_path: None,
                }
            }
            Err(e) => {
                println!("Step {}; {}; FAIL", number, label);
                error!("Step {} failed: {}", number, e);
                let screenshot_path = self.shot_on_fail(number).await;
                StepOutcome {
                    number,
                    label: label.to_string(),
                    passed: false,
                    error: Some(e.to_string()),
                    screenshot_path,
                }
            }
        };

        let passed = outcome.passed;
        self.report.steps.push(outcome);
        passed
    }

    /// One capture attempt; errors are logged and dropped
    async fn shot_on_fail(&self, number: u32) -> Option<PathBuf> {
        let name = format!(
            "step-{:02}-{}.png",
            number,
            chrono::Local::now().format("%Y%m%d-%H%M%S%.3f")
        );
        let path = self.screenshot_dir.join(name);

        match self.driver.screenshot(&path).await {
            Ok(()) => {
                info!("Screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Screenshot for step {} failed: {}", number, e);
                None
            }
        }
    }

    pub fn finish(self) -> SuiteReport {
        self.report
    }
}
