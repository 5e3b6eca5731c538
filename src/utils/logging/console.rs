//! Console summary of a ranking

use std::fmt::Write as _;

use crate::models::DistrictBreakdown;

/// Render the first `limit` ranked districts as an aligned table
#[must_use]
pub fn format_ranking(breakdowns: &[DistrictBreakdown], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>8}  {:>14}  {:>12}  {:>8}  {:>8}  {:>7}",
        "rank", "district", "annual_change", "monthly_sales", "z_price", "z_volume", "score"
    );
    for row in breakdowns.iter().take(limit) {
        let _ = writeln!(
            out,
            "{:>4}  {:>8}  {:>14.2}  {:>12.2}  {:>8.3}  {:>8.3}  {:>7.2}",
            row.rank,
            row.district,
            row.avg_annual_price_increase,
            row.avg_monthly_sales,
            row.z_price,
            row.z_volume,
            row.investment_score
        );
    }
    if breakdowns.len() > limit {
        let _ = writeln!(out, "... {} more", breakdowns.len() - limit);
    }
    out
}

/// Print the first `limit` ranked districts to stdout
pub fn print_ranking(breakdowns: &[DistrictBreakdown], limit: usize) {
    print!("{}", format_ranking(breakdowns, limit));
}
