//! Terminal rendering for CLI results.

use crate::core::search::GroupedResult;
use crate::core::similarity::RelatedInstrument;
use crate::services::market_data::{format_market_cap, MarketSnapshot};

pub fn print_groups(
    groups: &[GroupedResult],
    market: &MarketSnapshot,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let value: Vec<_> = groups
            .iter()
            .map(|group| {
                serde_json::json!({
                    "category": group.category,
                    "highestScore": group.highest_score,
                    "results": market.enrich(&group.results),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No matches");
        return Ok(());
    }

    for group in groups {
        println!("{} (score {})", group.category, group.highest_score);
        for hit in market.enrich(&group.results) {
            let cap = hit
                .market_cap
                .map(format_market_cap)
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<8} {:<40} {:>3} {:>10}",
                hit.result.record.symbol, hit.result.record.name, hit.result.score, cap
            );
        }
    }
    Ok(())
}

pub fn print_related(
    symbol: &str,
    related: &[RelatedInstrument],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(related)?);
        return Ok(());
    }

    if related.is_empty() {
        println!("Nothing related to {}", symbol.trim().to_uppercase());
        return Ok(());
    }

    for item in related {
        let cap = item
            .market_cap
            .map(format_market_cap)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<5} {:>6.2} {:>10} {:>9}  {}",
            item.symbol, item.kind, item.total_weight, cap, item.comparison_value, item.name
        );
    }
    Ok(())
}

pub fn print_lines(lines: &[String], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lines)?);
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}
