//! Step outcomes and the accumulated run report.
//!
//! Outcomes are three-valued. A permission-denied response on the final
//! check is neither a pass nor a hard failure, and conflating it with
//! failure would misreport the documentation as broken.

use colored::Colorize;

pub const STEP_LOGIN_TOKEN: &str = "Login with token";
pub const STEP_LOGIN_EMAIL: &str = "Login with email";
pub const STEP_GET_ORGANIZATIONS: &str = "Get organizations";
pub const STEP_REFRESH_TOKEN: &str = "Generate refresh token";
pub const STEP_USE_REFRESH_TOKEN: &str = "Use refresh token";

/// Steps whose outcomes decide the overall verdict. The final
/// refresh-token call is excluded: a failure there can mean missing
/// workspace permissions rather than wrong documentation.
pub const CORE_STEPS: [&str; 3] = [
    STEP_LOGIN_TOKEN,
    STEP_GET_ORGANIZATIONS,
    STEP_REFRESH_TOKEN,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Endpoint behaved as documented.
    Pass,
    /// Endpoint did not behave as documented (or the call itself failed).
    Fail,
    /// Indeterminate: the step could not tell documentation from
    /// environment (e.g. permission denied).
    Skip,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Skip => "SKIP",
        }
    }

    fn colored_label(&self) -> colored::ColoredString {
        match self {
            Outcome::Pass => self.label().green(),
            Outcome::Fail => self.label().red(),
            Outcome::Skip => self.label().yellow(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One recorded step: name plus outcome. Steps that never ran are not
/// recorded at all.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: &'static str,
    pub outcome: Outcome,
}

/// Ordered result set for one verification run.
#[derive(Debug, Default)]
pub struct RunReport {
    results: Vec<StepResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, outcome: Outcome) {
        self.results.push(StepResult { name, outcome });
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn outcome_of(&self, name: &str) -> Option<Outcome> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.outcome)
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Fail)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skip)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Whether every core step ran and passed.
    pub fn core_verified(&self) -> bool {
        CORE_STEPS
            .iter()
            .all(|step| self.outcome_of(step) == Some(Outcome::Pass))
    }

    /// Print the summary table and tallies.
    pub fn print_summary(&self) {
        println!();
        println!("{}", "=".repeat(60));
        println!("{}", "SUMMARY".bold());
        println!("{}", "=".repeat(60));

        for result in &self.results {
            println!("  [{}] {}", result.outcome.colored_label(), result.name);
        }

        println!();
        println!(
            "Total: {} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        );
    }
}
