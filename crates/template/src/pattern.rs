// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single registered pattern: regex, format string, and display metadata.

use crate::error::{Result, TemplateError};
use hive_core::TemplateKind;
use regex::Regex;

/// Describes one named capture group within a [`TemplatePattern`].
#[derive(Debug, Clone)]
pub struct GroupDef {
    pub name: &'static str,
    pub index: usize,
    /// Validator regex applied by [`crate::registry::TemplateRegistry::validate_message`]
    /// (e.g. Task IDs match `[A-Z0-9_]+`). `None` means "anything goes".
    pub validator: Option<&'static str>,
    pub description: &'static str,
}

/// A registered line-oriented wire pattern.
pub struct TemplatePattern {
    pub name: &'static str,
    pub kind: TemplateKind,
    pub regex: Regex,
    /// Human-readable format string, e.g. `"TASK:<ID>:<instruction>"`.
    pub format: &'static str,
    pub groups: Vec<GroupDef>,
    pub icon: &'static str,
    pub title: &'static str,
}

impl TemplatePattern {
    pub fn new(
        name: &'static str,
        kind: TemplateKind,
        pattern: &str,
        format: &'static str,
        groups: Vec<GroupDef>,
        icon: &'static str,
        title: &'static str,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|source| TemplateError::InvalidRegex { name: name.to_string(), source })?;
        if regex.captures_len() <= 1 {
            return Err(TemplateError::NoCaptureGroups { name: name.to_string() });
        }
        let mut seen = std::collections::HashSet::new();
        for g in &groups {
            if g.index == 0 || g.index >= regex.captures_len() || !seen.insert(g.index) {
                return Err(TemplateError::BadGroupIndex { name: name.to_string(), index: g.index });
            }
        }
        Ok(Self { name, kind, regex, format, groups, icon, title })
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
