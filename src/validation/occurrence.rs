//! Occurrence recording and grouping of results by rule.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::validation::rules::ValidationRule;

/// One recorded rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub prefix: String,
}

impl Occurrence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// All occurrences of one rule within a validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleGroup {
    pub rule: ValidationRule,
    pub occurrences: Vec<Occurrence>,
}

/// Rule-keyed occurrence lists for a single validation pass.
#[derive(Debug, Default)]
pub struct OccurrenceLog {
    by_rule: BTreeMap<ValidationRule, Vec<Occurrence>>,
}

impl OccurrenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an occurrence for `rule`. Insertion order is kept; nothing is
    /// deduplicated.
    pub fn record(&mut self, rule: ValidationRule, prefix: impl Into<String>) -> &Occurrence {
        let occurrence = Occurrence::new(prefix);
        debug!(rule = %rule, "{} {}", occurrence.prefix, rule.occurrence_suffix());

        let list = self.by_rule.entry(rule).or_default();
        list.push(occurrence);
        &list[list.len() - 1]
    }

    pub fn count(&self, rule: ValidationRule) -> usize {
        self.by_rule.get(&rule).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.by_rule.values().all(Vec::is_empty)
    }

    /// Consumes the log, emitting one group per rule that has occurrences,
    /// in rule order.
    pub fn into_groups(self) -> Vec<RuleGroup> {
        self.by_rule
            .into_iter()
            .filter(|(_, occurrences)| !occurrences.is_empty())
            .map(|(rule, occurrences)| RuleGroup { rule, occurrences })
            .collect()
    }
}
