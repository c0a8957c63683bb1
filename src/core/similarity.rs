//! Tag-weighted "similar instruments" recommender.
//!
//! Every other record in the catalog is compared with the target by tag
//! overlap. Exact tag matches contribute their full weight; a tag that merely
//! contains (or is contained in) a target tag contributes at most
//! [`PARTIAL_WEIGHT_CAP`]. Within one candidate, each target tag can be
//! claimed by a single candidate tag.

use serde::Serialize;
use std::cmp::Ordering;

use super::catalog::{CatalogIndex, InstrumentKind, InstrumentRecord};
use crate::error::{LensError, LensResult};

/// Maximum number of related instruments returned by [`find_similar`].
pub const MAX_RELATED: usize = 50;

/// Upper bound on the weight a partial tag match can contribute.
pub const PARTIAL_WEIGHT_CAP: f64 = 1.0;

/// A candidate related to the target instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInstrument {
    pub symbol: String,
    pub name: String,
    pub kind: InstrumentKind,
    pub total_weight: f64,
    pub comparison_value: String,
    pub all_tags: Vec<String>,
    pub market_cap: Option<f64>,
}

/// Find up to [`MAX_RELATED`] instruments sharing tags with `symbol`.
pub fn find_similar(symbol: &str, catalog: &CatalogIndex) -> LensResult<Vec<RelatedInstrument>> {
    find_similar_with_limit(symbol, catalog, MAX_RELATED)
}

/// Same as [`find_similar`] with an explicit result cap.
pub fn find_similar_with_limit(
    symbol: &str,
    catalog: &CatalogIndex,
    limit: usize,
) -> LensResult<Vec<RelatedInstrument>> {
    let target = catalog
        .lookup(symbol)
        .into_iter()
        .next()
        .ok_or_else(|| LensError::NotFound(symbol.trim().to_string()))?;
    let target_key = target.symbol_key();
    let target_tags = weighted_tags(target, catalog);

    let mut related: Vec<RelatedInstrument> = catalog
        .records()
        .iter()
        .filter(|record| record.symbol_key() != target_key)
        .filter_map(|record| {
            let total_weight = overlap_weight(&target_tags, &record.tags)?;
            let comparison = catalog.comparison(&record.symbol)?.trim();
            if comparison.is_empty() {
                return None;
            }
            Some(RelatedInstrument {
                symbol: record.symbol.clone(),
                name: record.name.clone(),
                kind: record.kind,
                total_weight,
                comparison_value: comparison.to_string(),
                all_tags: record.tags.clone(),
                market_cap: catalog.market_cap(&record.symbol),
            })
        })
        .collect();

    related.sort_by(compare_related);
    related.truncate(limit);

    log::debug!(
        "Found {} instruments related to {}",
        related.len(),
        target_key
    );
    Ok(related)
}

/// Target tags, lowercased and deduplicated, with resolved weights.
/// Kept in the target's tag order so partial matching is deterministic.
fn weighted_tags(target: &InstrumentRecord, catalog: &CatalogIndex) -> Vec<(String, f64)> {
    let mut tags: Vec<(String, f64)> = Vec::with_capacity(target.tags.len());
    for tag in &target.tags {
        let key = tag.trim().to_lowercase();
        if key.is_empty() || tags.iter().any(|(existing, _)| *existing == key) {
            continue;
        }
        let weight = catalog.tag_weights().weight(&key);
        tags.push((key, weight));
    }
    tags
}

/// Sum of matched tag weights, or `None` when nothing matched.
fn overlap_weight(target_tags: &[(String, f64)], candidate_tags: &[String]) -> Option<f64> {
    let mut target_used = vec![false; target_tags.len()];
    let candidate: Vec<String> = candidate_tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .collect();
    let mut candidate_used = vec![false; candidate.len()];

    let mut matched = 0usize;
    let mut total = 0.0_f64;

    // Exact pass
    for (ci, tag) in candidate.iter().enumerate() {
        if tag.is_empty() {
            continue;
        }
        let hit = target_tags
            .iter()
            .enumerate()
            .find(|(ti, (target, _))| !target_used[*ti] && target == tag);
        if let Some((ti, (_, weight))) = hit {
            target_used[ti] = true;
            candidate_used[ci] = true;
            matched += 1;
            total += *weight;
        }
    }

    // Partial pass over what the exact pass left
    for (ci, tag) in candidate.iter().enumerate() {
        if candidate_used[ci] || tag.is_empty() {
            continue;
        }
        let hit = target_tags.iter().enumerate().find(|(ti, (target, _))| {
            !target_used[*ti]
                && target != tag
                && (target.contains(tag.as_str()) || tag.contains(target.as_str()))
        });
        if let Some((ti, (_, weight))) = hit {
            target_used[ti] = true;
            candidate_used[ci] = true;
            matched += 1;
            total += weight.min(PARTIAL_WEIGHT_CAP);
        }
    }

    (matched > 0).then_some(total)
}

/// Weight descending, market cap descending (unknown last), symbol ascending
/// ignoring case.
fn compare_related(a: &RelatedInstrument, b: &RelatedInstrument) -> Ordering {
    b.total_weight
        .total_cmp(&a.total_weight)
        .then_with(|| {
            let a_cap = a.market_cap.unwrap_or(f64::NEG_INFINITY);
            let b_cap = b.market_cap.unwrap_or(f64::NEG_INFINITY);
            b_cap.total_cmp(&a_cap)
        })
        .then_with(|| a.symbol.to_uppercase().cmp(&b.symbol.to_uppercase()))
        .then_with(|| a.symbol.cmp(&b.symbol))
}
