// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pattern registry: detection, diagnosis, and validation over the
//! canonical Hive wire patterns.

use crate::error::Result;
use crate::pattern::{GroupDef, TemplatePattern};
use crate::similarity;
use hive_core::{Capture, TemplateDiagnosis, TemplateKind, TemplateMatch};
use regex::Regex;

/// Severity of a [`LintFinding`]: lint violations are warnings or info,
/// never errors; they never reject a well-formed line outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintLevel {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintFinding {
    pub level: LintLevel,
    pub message: String,
}

/// A registry of [`TemplatePattern`]s, built once at construction — not a
/// lazy-static global.
pub struct TemplateRegistry {
    patterns: Vec<TemplatePattern>,
    known_workers: Vec<String>,
}

const TASK_ID_VALIDATOR: &str = "^[A-Z0-9_]+$";
const MIN_INSTRUCTION_LEN: usize = 4;

impl TemplateRegistry {
    /// Build the registry with the five canonical wire patterns.
    pub fn with_defaults() -> Result<Self> {
        let patterns = vec![
            TemplatePattern::new(
                "task",
                TemplateKind::Task,
                r"^TASK:([A-Z0-9_]+):(.+)$",
                "TASK:<ID>:<instruction>",
                vec![
                    GroupDef { name: "task_id", index: 1, validator: Some(TASK_ID_VALIDATOR), description: "task identifier" },
                    GroupDef { name: "instruction", index: 2, validator: None, description: "instruction body" },
                ],
                "📋",
                "Task",
            )?,
            TemplatePattern::new(
                "worker_result",
                TemplateKind::WorkerResult,
                r"^WORKER_RESULT:([A-Za-z0-9_\-]+):([A-Z0-9_]+):(.+)$",
                "WORKER_RESULT:<worker>:<ID>:<result>",
                vec![
                    GroupDef { name: "worker", index: 1, validator: None, description: "reporting worker" },
                    GroupDef { name: "task_id", index: 2, validator: Some(TASK_ID_VALIDATOR), description: "task identifier" },
                    GroupDef { name: "result", index: 3, validator: None, description: "result body" },
                ],
                "✅",
                "Worker Result",
            )?,
            TemplatePattern::new(
                "queen_report",
                TemplateKind::QueenReport,
                r"^QUEEN_FINAL_REPORT:([A-Za-z0-9_\-]+):(.+)$",
                "QUEEN_FINAL_REPORT:<session>:<report>",
                vec![
                    GroupDef { name: "session", index: 1, validator: None, description: "session identifier" },
                    GroupDef { name: "report", index: 2, validator: None, description: "report body" },
                ],
                "👑",
                "Queen Final Report",
            )?,
            TemplatePattern::new(
                "collaboration",
                TemplateKind::Collaboration,
                r"^COLLABORATE:([A-Z0-9_]+):(.+)$",
                "COLLABORATE:<ID>:<body>",
                vec![
                    GroupDef { name: "collab_id", index: 1, validator: Some(TASK_ID_VALIDATOR), description: "collaboration identifier" },
                    GroupDef { name: "body", index: 2, validator: None, description: "collaboration body" },
                ],
                "🤝",
                "Collaborate",
            )?,
            TemplatePattern::new(
                "approval",
                TemplateKind::Approval,
                r"^APPROVAL:([A-Za-z0-9_\-]+):([A-Z0-9_]+):(.+)$",
                "APPROVAL:<reviewer>:<ID>:<body>",
                vec![
                    GroupDef { name: "reviewer", index: 1, validator: None, description: "reviewing worker" },
                    GroupDef { name: "task_id", index: 2, validator: Some(TASK_ID_VALIDATOR), description: "task identifier" },
                    GroupDef { name: "body", index: 3, validator: None, description: "approval body" },
                ],
                "🔏",
                "Approval",
            )?,
        ];
        Ok(Self { patterns, known_workers: Vec::new() })
    }

    /// Register worker names used by [`Self::validate_message`]'s
    /// "worker names should be from a known set" lint. Empty by default —
    /// the lint is skipped until the caller opts in.
    pub fn with_known_workers(mut self, workers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.known_workers = workers.into_iter().map(Into::into).collect();
        self
    }

    /// Try each pattern in registration order, returning the first match
    ///. Pure: never mutates registry state.
    pub fn detect(&self, line: &str) -> Option<TemplateMatch> {
        self.patterns.iter().find_map(|p| match_one(p, line))
    }

    /// Every pattern that matches `line`, sorted by confidence descending.
    pub fn detect_all(&self, line: &str) -> Vec<TemplateMatch> {
        let mut matches: Vec<TemplateMatch> =
            self.patterns.iter().filter_map(|p| match_one(p, line)).collect();
        matches.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        matches
    }

    /// [`Self::detect`], plus a diagnosis when nothing matches: the
    /// detected known prefix (if any), the closest pattern by sequence
    /// similarity above a `0.3` threshold, and concrete fix suggestions.
    pub fn detect_with_diagnosis(&self, line: &str) -> (Option<TemplateMatch>, Option<TemplateDiagnosis>) {
        if let Some(m) = self.detect(line) {
            return (Some(m), None);
        }

        let detected_prefix = self
            .patterns
            .iter()
            .find(|p| {
                let prefix = p.format.split(':').next().unwrap_or(p.format);
                line.starts_with(prefix)
            })
            .map(|p| format!("{}:", p.format.split(':').next().unwrap_or(p.format)));

        let closest = self
            .patterns
            .iter()
            .map(|p| (p, similarity::ratio(line, p.format)))
            .filter(|(_, score)| *score > 0.3)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let closest_pattern = closest.map(|(p, _)| p.name.to_string());

        let mut suggestions = Vec::new();
        if let Some((p, _)) = closest {
            suggestions.push(format!(
                "expected the shape `{}`, e.g. `{}`",
                p.format,
                example_line(p),
            ));
        }
        if detected_prefix.is_some() && closest.is_none() {
            suggestions.push("line starts with a known prefix but is missing required fields".to_string());
        }

        let diagnosis = TemplateDiagnosis { detected_prefix, closest_pattern, suggestions };
        (None, Some(diagnosis))
    }

    /// Schema check for the registry itself: every entry's regex compiles,
    /// has >= 1 capture group, and every `group.index` is unique and in
    /// range. Construction-time validation already enforces this — this is
    /// exposed separately so callers can re-validate a registry built
    /// elsewhere.
    pub fn validate_config(&self) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        for p in &self.patterns {
            if p.groups.is_empty() {
                findings.push(LintFinding {
                    level: LintLevel::Warning,
                    message: format!("pattern {:?} declares no groups", p.name),
                });
            }
        }
        findings
    }

    /// Lint a candidate line against the matched pattern's group
    /// validators: Task IDs should match `[A-Z0-9_]+` (warning), worker
    /// names should be from a known set (warning), overly short
    /// instructions/results are info.
    ///
    /// Matches the candidate pattern by shape (prefix + colon-delimited
    /// field count) rather than the strict `detect` regex: the strict
    /// regex already bakes the `[A-Z0-9_]+` ID check into the match
    /// itself, so a line with a malformed ID would never match it and
    /// the per-group validator below would never run — a malformed ID
    /// should be a warning, not grounds to not even recognize the line.
    pub fn validate_message(&self, line: &str) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        let Some((pattern, values)) =
            self.patterns.iter().find_map(|p| lenient_fields(p, line).map(|v| (p, v)))
        else {
            return findings;
        };

        for (group, value) in pattern.groups.iter().zip(values.iter()) {
            let value = *value;

            if let Some(validator) = group.validator {
                if let Ok(re) = Regex::new(validator) {
                    if !re.is_match(value) {
                        findings.push(LintFinding {
                            level: LintLevel::Warning,
                            message: format!("{} {:?} does not match {validator}", group.name, value),
                        });
                    }
                }
            }

            if group.name == "worker" || group.name == "reviewer" {
                if !self.known_workers.is_empty() && !self.known_workers.iter().any(|w| w == value) {
                    findings.push(LintFinding {
                        level: LintLevel::Warning,
                        message: format!("{} {:?} is not a known worker", group.name, value),
                    });
                }
            }

            if (group.name == "instruction" || group.name == "result" || group.name == "body")
                && value.trim().len() < MIN_INSTRUCTION_LEN
            {
                findings.push(LintFinding {
                    level: LintLevel::Info,
                    message: format!("{} {:?} looks unusually short", group.name, value),
                });
            }
        }

        findings
    }
}

/// Split `line` into `pattern.groups.len()` colon-delimited fields after
/// its literal prefix (e.g. `"TASK:"`), without validating field content —
/// used by [`TemplateRegistry::validate_message`] to recognize a
/// candidate line even when a field fails its own validator.
fn lenient_fields<'a>(pattern: &TemplatePattern, line: &'a str) -> Option<Vec<&'a str>> {
    let prefix = pattern.format.split(':').next().unwrap_or(pattern.format);
    let rest = line.strip_prefix(prefix)?.strip_prefix(':')?;
    let n = pattern.groups.len();
    if n == 0 {
        return None;
    }
    let fields: Vec<&str> = rest.splitn(n, ':').collect();
    if fields.len() == n {
        Some(fields)
    } else {
        None
    }
}

fn match_one(pattern: &TemplatePattern, line: &str) -> Option<TemplateMatch> {
    let m = pattern.regex.find(line)?;
    let captures = pattern.regex.captures(line)?;

    let groups: Vec<Capture> = pattern
        .groups
        .iter()
        .filter_map(|g| captures.get(g.index).map(|c| Capture { name: g.name.to_string(), value: c.as_str().to_string() }))
        .collect();

    let mut confidence: f64 = 0.8;
    if m.start() == 0 {
        confidence += 0.1;
    }
    if (m.end() - m.start()) as f64 > line.len() as f64 * 0.5 {
        confidence += 0.1;
    }

    Some(TemplateMatch::new(pattern.kind, groups, confidence.min(1.0)))
}

/// A copy-pasteable example line for a pattern's fix suggestion, using IDs
/// that pass the `[A-Z0-9_]+` validator — suggestions are directly usable,
/// not bare placeholders.
fn example_line(pattern: &TemplatePattern) -> String {
    match pattern.kind {
        TemplateKind::Task => "TASK:EXAMPLE_001:<instruction>".to_string(),
        TemplateKind::WorkerResult => "WORKER_RESULT:dev:EXAMPLE_001:<result>".to_string(),
        TemplateKind::QueenReport => "QUEEN_FINAL_REPORT:session-1:<report>".to_string(),
        TemplateKind::Collaboration => "COLLABORATE:EXAMPLE_001:<body>".to_string(),
        TemplateKind::Approval => "APPROVAL:dev:EXAMPLE_001:<body>".to_string(),
        TemplateKind::Unknown => pattern.format.to_string(),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
