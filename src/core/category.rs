//! Match categories and the per-category scoring rules.
//!
//! Every keyword is scored independently against one record in one category.
//! Stock and ETF variants of a category share the same rules; only the kind
//! of record they apply to differs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::{InstrumentKind, InstrumentRecord};
use super::fuzzy::{fuzzy_match, DEFAULT_MAX_DISTANCE};

/// The record field a category scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchField {
    Symbol,
    Name,
    Tag,
    Description,
}

/// One of the eight matching dimensions (field x kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchCategory {
    StockSymbol,
    EtfSymbol,
    StockName,
    EtfName,
    StockTag,
    EtfTag,
    StockDescription,
    EtfDescription,
}

impl MatchCategory {
    /// All categories in evaluation order.
    pub const ALL: [MatchCategory; 8] = [
        MatchCategory::StockSymbol,
        MatchCategory::EtfSymbol,
        MatchCategory::StockName,
        MatchCategory::EtfName,
        MatchCategory::StockTag,
        MatchCategory::EtfTag,
        MatchCategory::StockDescription,
        MatchCategory::EtfDescription,
    ];

    /// Tie-break priority between categories with the same highest score.
    pub fn priority(self) -> i32 {
        match self {
            MatchCategory::StockSymbol | MatchCategory::EtfSymbol => 1000,
            MatchCategory::StockTag => 800,
            MatchCategory::EtfTag => 790,
            MatchCategory::StockName | MatchCategory::EtfName => 500,
            MatchCategory::StockDescription | MatchCategory::EtfDescription => 300,
        }
    }

    pub fn kind(self) -> InstrumentKind {
        match self {
            MatchCategory::StockSymbol
            | MatchCategory::StockName
            | MatchCategory::StockTag
            | MatchCategory::StockDescription => InstrumentKind::Stock,
            MatchCategory::EtfSymbol
            | MatchCategory::EtfName
            | MatchCategory::EtfTag
            | MatchCategory::EtfDescription => InstrumentKind::Etf,
        }
    }

    pub fn field(self) -> MatchField {
        match self {
            MatchCategory::StockSymbol | MatchCategory::EtfSymbol => MatchField::Symbol,
            MatchCategory::StockName | MatchCategory::EtfName => MatchField::Name,
            MatchCategory::StockTag | MatchCategory::EtfTag => MatchField::Tag,
            MatchCategory::StockDescription | MatchCategory::EtfDescription => {
                MatchField::Description
            }
        }
    }

    /// Section heading shown above the category's results.
    pub fn title(self) -> &'static str {
        match self {
            MatchCategory::StockSymbol => "Stock Symbols",
            MatchCategory::EtfSymbol => "ETF Symbols",
            MatchCategory::StockName => "Stock Names",
            MatchCategory::EtfName => "ETF Names",
            MatchCategory::StockTag => "Stock Tags",
            MatchCategory::EtfTag => "ETF Tags",
            MatchCategory::StockDescription => "Stock Descriptions",
            MatchCategory::EtfDescription => "ETF Descriptions",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Score one lowercased keyword against a record in a category.
///
/// Returns `None` when the keyword does not match, otherwise a score in
/// `1..=4`. The record's kind is not checked here; the caller only passes
/// records of the category's kind.
pub fn score_keyword(
    record: &InstrumentRecord,
    keyword: &str,
    category: MatchCategory,
) -> Option<u32> {
    match category.field() {
        MatchField::Symbol => ladder_score(&record.symbol.to_lowercase(), keyword),
        MatchField::Name => name_score(&record.name, keyword),
        MatchField::Tag => record
            .tags
            .iter()
            .filter_map(|tag| ladder_score(&tag.to_lowercase(), keyword))
            .max(),
        MatchField::Description => {
            description_score(&record.description1, &record.description2, keyword)
        }
    }
}

/// Exact (3), substring (2), fuzzy (1). Shared by symbols and tags.
fn ladder_score(value: &str, keyword: &str) -> Option<u32> {
    if value.is_empty() {
        return None;
    }
    if value == keyword {
        Some(3)
    } else if value.contains(keyword) {
        Some(2)
    } else if fuzzy_match(value, keyword, DEFAULT_MAX_DISTANCE) {
        Some(1)
    } else {
        None
    }
}

fn name_score(name: &str, keyword: &str) -> Option<u32> {
    let full = name.trim().to_lowercase();
    if full.is_empty() {
        return None;
    }
    // "Apple Inc., Common Stock" -> "apple inc."
    let primary = full.split(',').next().unwrap_or(&full).trim();

    if full == keyword {
        Some(4)
    } else if primary.split_whitespace().any(|word| word == keyword) {
        Some(3)
    } else if primary.contains(keyword) {
        Some(2)
    } else if full.contains(keyword) || fuzzy_match(&full, keyword, DEFAULT_MAX_DISTANCE) {
        Some(1)
    } else {
        None
    }
}

fn description_score(description1: &str, description2: &str, keyword: &str) -> Option<u32> {
    let first = description1.to_lowercase();
    let second = description2.to_lowercase();

    let whole_word = first
        .split_whitespace()
        .chain(second.split_whitespace())
        .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation()))
        .any(|word| word == keyword);

    if whole_word {
        Some(2)
    } else if first.contains(keyword) || second.contains(keyword) {
        Some(1)
    } else {
        None
    }
}
