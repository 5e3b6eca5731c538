use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

use district_score::algorithm::stats::population_moments;
use district_score::config::{LoaderConfig, PipelineConfig, ScoringConfig};
use district_score::error::Error;
use district_score::models::PropertySale;
use district_score::{run_from_path, run_pipeline};

use crate::utils::{random_rows, row, two_district_rows, write_delimited};

fn sale(taxkey: &str, district: i64, year: i32, month: u32, price: i64) -> PropertySale {
    PropertySale::new(
        taxkey,
        district,
        NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        price,
    )
}

#[test]
fn test_two_districts_score_plus_and_minus_one() {
    let dir = TempDir::new().unwrap();
    let path = write_delimited(dir.path(), "sales.csv", ',', &two_district_rows());

    let output = run_from_path(&path, &PipelineConfig::default()).unwrap();

    assert_eq!(output.scores.len(), 2);
    assert_eq!(output.scores[0].district, 2);
    assert_eq!(output.scores[0].investment_score, 1.0);
    assert_eq!(output.scores[1].district, 1);
    assert_eq!(output.scores[1].investment_score, -1.0);

    let top = &output.breakdowns[0];
    assert_eq!(top.rank, 1);
    assert_eq!(top.avg_annual_price_increase, 3000.0);
    assert_eq!(top.avg_monthly_sales, 2.0);
    assert!((top.z_price - 1.0).abs() < 1e-12);
    assert!((top.z_volume - 1.0).abs() < 1e-12);
}

#[test]
fn test_repeat_sale_gain_is_annualized() {
    let sales = vec![
        sale("100", 4, 2010, 1, 100_000),
        sale("100", 4, 2015, 1, 150_000),
    ];
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();

    let metric = &output.metrics[0];
    assert_eq!(metric.district, 4);
    assert_eq!(metric.avg_annual_price_increase, Some(10_000.0));
    assert_eq!(metric.price_pair_count, 1);
}

#[test]
fn test_single_sale_district_has_no_price_metric() {
    let sales = vec![
        sale("1", 1, 2010, 1, 100_000),
        sale("1", 1, 2012, 1, 120_000),
        sale("2", 2, 2010, 1, 100_000),
        sale("2", 2, 2011, 1, 130_000),
        sale("3", 3, 2011, 5, 90_000),
        sale("4", 3, 2011, 6, 95_000),
    ];
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();

    let district_3 = output.metrics.iter().find(|m| m.district == 3).unwrap();
    assert_eq!(district_3.avg_annual_price_increase, None);
    assert_eq!(district_3.avg_monthly_sales, 1.0);
    assert_eq!(output.report.excluded_districts, vec![3]);
    assert!(output.scores.iter().all(|s| s.district != 3));
}

#[test]
fn test_same_year_resale_is_skipped() {
    let sales = vec![
        sale("1", 1, 2012, 1, 100_000),
        sale("1", 1, 2012, 11, 180_000),
        sale("2", 2, 2010, 1, 100_000),
        sale("2", 2, 2011, 1, 101_000),
    ];
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();

    assert_eq!(output.report.same_year_pairs, 1);
    assert_eq!(output.report.valid_pairs, 1);
    let district_1 = output.metrics.iter().find(|m| m.district == 1).unwrap();
    assert_eq!(district_1.avg_annual_price_increase, None);
}

#[test]
fn test_monthly_counts_average_over_active_months() {
    // 12 months with 240 sales in total
    let mut sales = Vec::new();
    for month in 1..=12u32 {
        let count = if month % 2 == 0 { 30 } else { 10 };
        for i in 0..count {
            sales.push(sale(&format!("{month}-{i}"), 9, 2014, month, 100_000));
        }
    }
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();

    let metric = &output.metrics[0];
    assert_eq!(metric.sale_count, 240);
    assert_eq!(metric.month_count, 12);
    assert_eq!(metric.avg_monthly_sales, 20.0);
}

#[test]
fn test_random_scores_are_standardized() {
    let mut rng = StdRng::seed_from_u64(7);
    let dir = TempDir::new().unwrap();
    let path = write_delimited(dir.path(), "sales.csv", ',', &random_rows(&mut rng, 25, 40));

    let output = run_from_path(&path, &PipelineConfig::default()).unwrap();
    assert_eq!(output.breakdowns.len(), 25);
    assert!(output.report.degenerate_metrics.is_empty());

    for values in [
        output.breakdowns.iter().map(|b| b.z_price).collect::<Vec<_>>(),
        output.breakdowns.iter().map(|b| b.z_volume).collect::<Vec<_>>(),
    ] {
        let moments = population_moments(&values).unwrap();
        assert!(moments.mean.abs() < 1e-9);
        assert!((moments.stddev - 1.0).abs() < 1e-9);
    }

    for pair in output.breakdowns.windows(2) {
        assert!(
            pair[0].investment_score > pair[1].investment_score
                || (pair[0].investment_score == pair[1].investment_score
                    && pair[0].district < pair[1].district)
        );
        assert_eq!(pair[1].rank, pair[0].rank + 1);
    }

    for b in &output.breakdowns {
        let expected = 0.7 * b.z_price + 0.3 * b.z_volume;
        assert!((b.investment_score - expected).abs() <= 0.005 + 1e-9);
    }
}

#[test]
fn test_equal_scores_rank_by_district() {
    let sales = vec![
        sale("a", 9, 2010, 1, 100_000),
        sale("a", 9, 2011, 1, 101_000),
        sale("b", 5, 2010, 1, 100_000),
        sale("b", 5, 2011, 1, 101_000),
        sale("c", 7, 2010, 1, 100_000),
        sale("c", 7, 2011, 1, 103_000),
        sale("d", 7, 2010, 1, 100_000),
        sale("e", 7, 2011, 1, 100_000),
    ];
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();

    let order: Vec<i64> = output.scores.iter().map(|s| s.district).collect();
    assert_eq!(order, vec![7, 5, 9]);
    assert_eq!(output.scores[1].investment_score, output.scores[2].investment_score);
}

#[test]
fn test_sale_month_window() {
    let dir = TempDir::new().unwrap();
    let mut rows = two_district_rows();
    rows.push(row("A", 1, "2009-06", 90_000));
    rows.push(row("B", 2, "2012-02", 110_000));
    let path = write_delimited(dir.path(), "sales.csv", ',', &rows);

    let config = PipelineConfig {
        loader: LoaderConfig::default()
            .with_month_window(Some("2010-01"), Some("2011-12"))
            .unwrap(),
        ..Default::default()
    };
    let output = run_from_path(&path, &config).unwrap();

    assert_eq!(output.report.rows_loaded, 8);
    assert_eq!(output.report.rows_in_window, 6);
    let order: Vec<(i64, f64)> = output
        .scores
        .iter()
        .map(|s| (s.district, s.investment_score))
        .collect();
    assert_eq!(order, vec![(2, 1.0), (1, -1.0)]);
}

#[test]
fn test_zero_spread_metric_is_reported_or_fatal() {
    // Same volume everywhere, different price trends
    let sales = vec![
        sale("a", 1, 2010, 1, 100_000),
        sale("a", 1, 2011, 1, 101_000),
        sale("b", 2, 2010, 1, 100_000),
        sale("b", 2, 2011, 1, 105_000),
    ];
    let output = run_pipeline(&sales, &ScoringConfig::default()).unwrap();
    assert_eq!(output.report.degenerate_metrics, vec!["avg_monthly_sales".to_string()]);
    assert_eq!(output.scores[0].district, 2);
    assert_eq!(output.scores[0].investment_score, 0.7);

    let strict = ScoringConfig {
        fail_on_zero_stddev: true,
        ..Default::default()
    };
    assert!(matches!(
        run_pipeline(&sales, &strict),
        Err(Error::DegenerateMetric { .. })
    ));
}

#[test]
fn test_malformed_date_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut rows = two_district_rows();
    rows.push(row("Z", 3, "2011/04", 1));
    let path = write_delimited(dir.path(), "sales.csv", ',', &rows);

    let err = run_from_path(&path, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidSaleDate { row: 6, .. }));
}

#[test]
fn test_invalid_config_is_rejected_before_loading() {
    let mut config = PipelineConfig::default();
    config.scoring.price_weight = -1.0;
    let err = run_from_path(std::path::Path::new("does-not-exist.csv"), &config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
