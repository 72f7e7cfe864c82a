//! Feature files: a Gherkin subset bound to the scenario step operations.
//!
//! Supported: `Feature:`, `Background:`, `Scenario:`, `Given`/`When`/`Then`/
//! `And`/`But` steps, `@tags` (ignored), `#` comments. Each scenario runs
//! against a fresh [`ScenarioContext`] and stops at its first failing step.

use crate::error::VerifyError;
use crate::poll::JobCondition;
use crate::scenario::{self, ScenarioContext, StepEnv};
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    And,
    But,
}

impl StepKeyword {
    fn split(line: &str) -> Option<(StepKeyword, &str)> {
        let (word, rest) = line.split_once(char::is_whitespace)?;
        let keyword = match word {
            "Given" => StepKeyword::Given,
            "When" => StepKeyword::When,
            "Then" => StepKeyword::Then,
            "And" => StepKeyword::And,
            "But" => StepKeyword::But,
            _ => return None,
        };
        Some((keyword, rest.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub keyword: StepKeyword,
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub line: usize,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub path: String,
    pub background: Vec<Step>,
    pub scenarios: Vec<Scenario>,
}

enum Section {
    Preamble,
    Description,
    Background,
    Scenario,
}

/// Parse feature text; `path` is only used in error messages and reports.
pub fn parse_feature(path: &str, text: &str) -> Result<Feature, VerifyError> {
    let error = |line: usize, message: String| VerifyError::Feature {
        path: path.to_string(),
        line,
        message,
    };

    let mut feature = Feature {
        name: String::new(),
        path: path.to_string(),
        background: Vec::new(),
        scenarios: Vec::new(),
    };
    let mut section = Section::Preamble;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            continue;
        }

        if let Some(name) = line.strip_prefix("Feature:") {
            if !matches!(section, Section::Preamble) {
                return Err(error(line_no, "only one Feature per file".to_string()));
            }
            feature.name = name.trim().to_string();
            section = Section::Description;
        } else if line.starts_with("Background:") {
            if matches!(section, Section::Preamble) || !feature.scenarios.is_empty() {
                return Err(error(line_no, "Background must precede all scenarios".to_string()));
            }
            section = Section::Background;
        } else if let Some(name) = line.strip_prefix("Scenario:") {
            if matches!(section, Section::Preamble) {
                return Err(error(line_no, "Scenario before Feature".to_string()));
            }
            feature.scenarios.push(Scenario {
                name: name.trim().to_string(),
                line: line_no,
                steps: Vec::new(),
            });
            section = Section::Scenario;
        } else if let Some((keyword, text)) = StepKeyword::split(line) {
            let step = Step {
                keyword,
                text: text.to_string(),
                line: line_no,
            };
            match section {
                Section::Background => feature.background.push(step),
                Section::Scenario => {
                    if let Some(scenario) = feature.scenarios.last_mut() {
                        scenario.steps.push(step);
                    }
                }
                Section::Preamble | Section::Description => {
                    return Err(error(line_no, "step outside of a scenario".to_string()));
                }
            }
        } else if matches!(section, Section::Description) {
            continue;
        } else {
            return Err(error(line_no, format!("unexpected line '{}'", line)));
        }
    }

    if matches!(section, Section::Preamble) {
        return Err(error(1, "missing Feature".to_string()));
    }
    Ok(feature)
}

pub fn load_feature(path: &Path) -> Result<Feature, VerifyError> {
    let text = std::fs::read_to_string(path)?;
    parse_feature(&path.display().to_string(), &text)
}

type StepFn = fn(&StepEnv<'_>, &mut ScenarioContext, &Captures<'_>) -> Result<(), VerifyError>;

struct StepDef {
    pattern: Regex,
    handler: StepFn,
}

/// Step phrases and the operations they run.
pub struct StepRegistry {
    steps: Vec<StepDef>,
}

fn text<'c>(caps: &'c Captures<'_>, i: usize) -> &'c str {
    caps.get(i).map(|m| m.as_str()).unwrap_or_default()
}

fn number(caps: &Captures<'_>, i: usize) -> Result<u32, VerifyError> {
    let raw = text(caps, i);
    raw.parse()
        .map_err(|_| VerifyError::assertion(format!("Faulty number '{}' in step", raw)))
}

const KS_TBL: &str = r"([^.\s]+)\.(\S+)";

impl StepRegistry {
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Bind `pattern` (matched against the whole step text) to `handler`.
    pub fn register(&mut self, pattern: &str, handler: StepFn) -> Result<(), VerifyError> {
        let pattern = Regex::new(&format!("^{}$", pattern))
            .map_err(|e| VerifyError::Config(format!("Invalid step pattern '{}': {}", pattern, e)))?;
        self.steps.push(StepDef { pattern, handler });
        Ok(())
    }

    /// The repair-status step vocabulary.
    pub fn repair_status_steps() -> Result<Self, VerifyError> {
        let mut registry = Self::empty();

        registry.register("we list all tables", |env, ctx, _| {
            scenario::list_tables(env, ctx, None, None)
        })?;
        registry.register(r"we list all tables with a limit of (\d+)", |env, ctx, caps| {
            scenario::list_tables(env, ctx, None, Some(number(caps, 1)?))
        })?;
        registry.register(
            r"we list all tables for keyspace (\S+) with a limit of (\d+)",
            |env, ctx, caps| scenario::list_tables(env, ctx, Some(text(caps, 1)), Some(number(caps, 2)?)),
        )?;
        registry.register(r"we list all tables for keyspace (\S+)", |env, ctx, caps| {
            scenario::list_tables(env, ctx, Some(text(caps, 1)), None)
        })?;
        registry.register(&format!("we list jobs for table {}", KS_TBL), |env, ctx, caps| {
            scenario::list_jobs_for_table(env, ctx, text(caps, 1), text(caps, 2))
        })?;
        registry.register(
            &format!(r"we show job {} with a limit of (\d+)", KS_TBL),
            |env, ctx, caps| {
                scenario::show_job(env, ctx, text(caps, 1), text(caps, 2), number(caps, 3)?).map(|_| ())
            },
        )?;
        registry.register(&format!("we trigger a repair for {}", KS_TBL), |env, ctx, caps| {
            scenario::trigger_repair(env, ctx, text(caps, 1), text(caps, 2))
        })?;
        registry.register(r#"the repair response is "(.*)""#, |_, ctx, caps| {
            ctx.set_response(text(caps, 1));
            Ok(())
        })?;
        registry.register("the output should contain a valid header", |_, ctx, _| {
            scenario::expect_valid_header(ctx)
        })?;
        registry.register(
            &format!("the output should contain a row for {}", KS_TBL),
            |_, ctx, caps| scenario::expect_row(ctx, text(caps, 1), text(caps, 2)),
        )?;
        registry.register("the output should not contain more rows", |_, ctx, _| {
            scenario::expect_no_more_rows(ctx)
        })?;
        registry.register(r"the output should contain (\d+) rows?", |_, ctx, caps| {
            scenario::expect_row_count(ctx, number(caps, 1)? as usize)
        })?;
        registry.register("the output should contain summary", |_, ctx, _| {
            scenario::expect_summary(ctx).map(|_| ())
        })?;
        registry.register(
            &format!("the expected header should be for {}", KS_TBL),
            |_, ctx, caps| scenario::expect_detail_header(ctx, text(caps, 1), text(caps, 2)),
        )?;
        registry.register(r"the token list should contain (\d+) rows?", |_, ctx, caps| {
            scenario::expect_token_rows(ctx, number(caps, 1)? as usize)
        })?;
        registry.register(
            &format!("the job for {} disappears when it is finished", KS_TBL),
            |env, ctx, _| {
                scenario::expect_job_reaches(env, ctx, JobCondition::Disappeared).map(|_| ())
            },
        )?;
        registry.register(
            &format!("the job for {} change status to completed", KS_TBL),
            |env, ctx, _| scenario::expect_job_reaches(env, ctx, JobCondition::Completed).map(|_| ()),
        )?;

        Ok(registry)
    }

    /// Run the first definition whose pattern matches `text`.
    pub fn run(
        &self,
        env: &StepEnv<'_>,
        ctx: &mut ScenarioContext,
        text: &str,
    ) -> Result<(), VerifyError> {
        for def in &self.steps {
            if let Some(caps) = def.pattern.captures(text) {
                return (def.handler)(env, ctx, &caps);
            }
        }
        Err(VerifyError::UndefinedStep(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Undefined,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub line: usize,
    pub outcome: Outcome,
    pub steps_run: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub name: String,
    pub path: String,
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub features: Vec<FeatureReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            features: Vec::new(),
        }
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.features.iter().flat_map(|f| f.scenarios.iter())
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.scenarios().filter(|s| s.outcome == outcome).count()
    }

    pub fn passed(&self) -> bool {
        self.scenarios().all(|s| s.outcome == Outcome::Passed)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every scenario of `feature`, background steps first.
pub fn run_feature(feature: &Feature, registry: &StepRegistry, env: &StepEnv<'_>) -> FeatureReport {
    info!(feature = %feature.name, scenarios = feature.scenarios.len(), "Running feature");
    let scenarios = feature
        .scenarios
        .iter()
        .map(|scenario| run_scenario(&feature.background, scenario, registry, env))
        .collect();
    FeatureReport {
        name: feature.name.clone(),
        path: feature.path.clone(),
        scenarios,
    }
}

fn run_scenario(
    background: &[Step],
    scenario: &Scenario,
    registry: &StepRegistry,
    env: &StepEnv<'_>,
) -> ScenarioReport {
    let started = Instant::now();
    let mut ctx = ScenarioContext::new();
    let mut report = ScenarioReport {
        name: scenario.name.clone(),
        line: scenario.line,
        outcome: Outcome::Passed,
        steps_run: 0,
        failed_step: None,
        message: None,
        duration_ms: 0,
    };

    for step in background.iter().chain(scenario.steps.iter()) {
        debug!(line = step.line, step = %step.text, "Step");
        report.steps_run += 1;
        if let Err(err) = registry.run(env, &mut ctx, &step.text) {
            warn!(scenario = %scenario.name, step = %step.text, error = %err, "Step failed");
            report.outcome = match err {
                VerifyError::UndefinedStep(_) => Outcome::Undefined,
                _ => Outcome::Failed,
            };
            report.failed_step = Some(format!("{:?} {}", step.keyword, step.text));
            report.message = Some(err.to_string());
            break;
        }
    }

    report.duration_ms = started.elapsed().as_millis() as u64;
    report
}
