//! Row-layout pattern detection for subject blocks.
//!
//! Every subject block encodes its streams in one of four layouts:
//! - `1a`: each row carries its own practical/lab hours
//! - `1b`: a row with hours starts a stream, blank rows merge into it
//! - `implicit_subgroup`: the same group repeats across rows
//! - `explicit_subgroup`: groups carry subgroup notation (/1/, \1\, -1)

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::normalize::has_explicit_subgroup;
use super::parser::WorkRow;

/// Data entry pattern of a subject block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    #[serde(rename = "1a")]
    OneA,
    #[serde(rename = "1b")]
    OneB,
    #[serde(rename = "implicit_subgroup")]
    ImplicitSubgroup,
    #[serde(rename = "explicit_subgroup")]
    ExplicitSubgroup,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::OneA => "1a",
            Pattern::OneB => "1b",
            Pattern::ImplicitSubgroup => "implicit_subgroup",
            Pattern::ExplicitSubgroup => "explicit_subgroup",
        }
    }
}

/// Detect which layout a subject block uses.
///
/// Decision order:
/// 1. any group with explicit subgroup notation → `ExplicitSubgroup`
/// 2. any group string repeated in the block → `ImplicitSubgroup`
/// 3. more than half of the rows carry practical hours → `OneA`, else `OneB`
///
/// A block with no group cells defaults to `OneA`. The function is a pure
/// decision over its input rows.
pub fn detect_pattern(rows: &[WorkRow]) -> Pattern {
    let groups: Vec<&str> = rows
        .iter()
        .map(|r| r.group.as_str())
        .filter(|g| !g.is_empty())
        .collect();

    if groups.is_empty() {
        return Pattern::OneA;
    }

    if groups.iter().any(|g| has_explicit_subgroup(g)) {
        return Pattern::ExplicitSubgroup;
    }

    let mut seen = HashSet::new();
    for group in &groups {
        if !seen.insert(*group) {
            return Pattern::ImplicitSubgroup;
        }
    }

    let filled = rows.iter().filter(|r| r.practical > 0).count();
    if filled as f64 / rows.len() as f64 > 0.5 {
        Pattern::OneA
    } else {
        Pattern::OneB
    }
}
