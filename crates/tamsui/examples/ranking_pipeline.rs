//! Example: Quarterly fundamentals to a daily composite ranking
//!
//! Walks through the core pipeline on a small synthetic universe:
//! - `QuarterlyTable` / `expand_to_long`: forward-fill disclosures onto trading days
//! - `rank_factor`: rank each date's cross-section
//! - `WeightedRankCombiner`: blend two factor rankings
//! - `top_n_by_group`: pick the best names per date

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use tamsui::{
    calendar::{TradingCalendar, date_to_quarter, quarter_to_window},
    primitives::columns,
    rank::{WeightedRankCombiner, rank_factor},
    utils::{QuarterlyTable, expand_to_long, top_n_by_group},
};

const SYMBOLS: &[&str] = &["1101", "2317", "2330", "2454", "2882"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Quarterly factors to daily composite ranks ===\n");

    // =========================================================================
    // DISCLOSURE WINDOWS
    // =========================================================================

    for label in ["2023-Q3", "2023-Q4", "2024-Q1"] {
        let window = quarter_to_window(label)?;
        println!("{label}: disclosed {} .. {}", window.start, window.end);
    }
    let today = NaiveDate::from_ymd_opt(2024, 6, 3).ok_or("bad date")?;
    println!("{today} falls in the {} window\n", date_to_quarter(today));

    // =========================================================================
    // BUILD QUARTERLY TABLES
    // =========================================================================

    let disclosures = [
        NaiveDate::from_ymd_opt(2024, 3, 31).ok_or("bad date")?,
        NaiveDate::from_ymd_opt(2024, 5, 15).ok_or("bad date")?,
    ];

    let mut roe = QuarterlyTable::new();
    let mut pb = QuarterlyTable::new();
    for (q, &date) in disclosures.iter().enumerate() {
        for (i, &symbol) in SYMBOLS.iter().enumerate() {
            let drift = q as f64 * 0.01;
            roe.insert(date, symbol, Some(0.05 + 0.03 * i as f64 + drift));
            // 2882 has no book value in the first disclosure.
            let value = (symbol != "2882" || q > 0).then(|| 1.0 + ((i * 7) % 5) as f64 - drift);
            pb.insert(date, symbol, value);
        }
    }

    // Weekday sessions in May and June 2024.
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).ok_or("bad date")?;
    let sessions: Vec<NaiveDate> = start
        .iter_days()
        .take(61)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();
    let calendar = TradingCalendar::new(sessions)?;
    println!(
        "Trading calendar: {} sessions, {} .. {}\n",
        calendar.len(),
        calendar.first(),
        calendar.last()
    );

    // =========================================================================
    // EXPAND AND RANK
    // =========================================================================

    let roe_daily = expand_to_long(&roe.to_frame()?, &calendar, columns::DATE, &[])?;
    let pb_daily = expand_to_long(&pb.to_frame()?, &calendar, columns::DATE, &[])?;
    println!("Daily ROE (first 10 rows):\n{}\n", roe_daily.head(Some(10)));

    // High ROE is good, low P/B is good: rank 1 = best in both.
    let roe_rank = rank_factor(roe_daily.lazy(), false)?;
    let pb_rank = rank_factor(pb_daily.lazy(), true)?;
    println!("P/B ranks on the first session:\n{}\n", pb_rank.head(Some(SYMBOLS.len())));

    // =========================================================================
    // COMBINE
    // =========================================================================

    let composite = WeightedRankCombiner::new(true)
        .combine(&[roe_rank.lazy(), pb_rank.lazy()], &[0.6, 0.4])?;
    println!("Composite ranks (first 10 rows):\n{}\n", composite.head(Some(10)));

    let best = top_n_by_group(composite.lazy(), 2, columns::WEIGHTED_RANK, &[columns::DATE], true)
        .sort([columns::DATE, columns::WEIGHTED_RANK], SortMultipleOptions::default())
        .collect()?;
    println!("Top 2 per session (first 6 rows):\n{}", best.head(Some(6)));

    Ok(())
}
