//! Monthly sales volume per district

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::PropertySale;

/// Sales-volume metric of one district
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictVolume {
    /// Mean sales per month with at least one sale
    pub avg_monthly_sales: f64,
    /// Total sales
    pub sale_count: usize,
    /// Months with at least one sale
    pub month_count: usize,
}

/// Sale counts keyed by `(district, year, month)`
#[must_use]
pub fn monthly_sales_counts(sales: &[PropertySale]) -> BTreeMap<(i64, i32, u32), usize> {
    let mut counts = BTreeMap::new();
    for sale in sales {
        *counts
            .entry((sale.district, sale.sale_date.year(), sale.sale_date.month()))
            .or_insert(0) += 1;
    }
    counts
}

/// Mean of the monthly sale counts of each district.
///
/// Every sale counts, repeat or not. Months in which a district had no sale
/// are not buckets and do not pull its average down.
#[must_use]
pub fn average_monthly_sales(sales: &[PropertySale]) -> BTreeMap<i64, DistrictVolume> {
    let mut totals: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
    for ((district, _, _), count) in monthly_sales_counts(sales) {
        let (sale_count, month_count) = totals.entry(district).or_default();
        *sale_count += count;
        *month_count += 1;
    }

    totals
        .into_iter()
        .map(|(district, (sale_count, month_count))| {
            let volume = DistrictVolume {
                avg_monthly_sales: sale_count as f64 / month_count as f64,
                sale_count,
                month_count,
            };
            log::debug!(
                "District {district}: {sale_count} sales over {month_count} months ({:.2}/month)",
                volume.avg_monthly_sales
            );
            (district, volume)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale(district: i64, year: i32, month: u32) -> PropertySale {
        PropertySale::new(
            format!("{district}-{year}-{month}"),
            district,
            NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            1,
        )
    }

    #[test]
    fn test_twelve_months_summing_to_240() {
        let mut sales = Vec::new();
        for month in 1..=12 {
            // uneven months, 240 in total
            let n = if month % 2 == 0 { 25 } else { 15 };
            for _ in 0..n {
                sales.push(sale(7, 2018, month));
            }
        }
        let volumes = average_monthly_sales(&sales);
        assert_eq!(volumes[&7].sale_count, 240);
        assert_eq!(volumes[&7].month_count, 12);
        assert_eq!(volumes[&7].avg_monthly_sales, 20.0);
    }

    #[test]
    fn test_same_month_different_years_are_separate_buckets() {
        let sales = vec![sale(1, 2010, 3), sale(1, 2011, 3), sale(1, 2011, 3)];
        let counts = monthly_sales_counts(&sales);
        assert_eq!(counts[&(1, 2010, 3)], 1);
        assert_eq!(counts[&(1, 2011, 3)], 2);
        assert_eq!(average_monthly_sales(&sales)[&1].avg_monthly_sales, 1.5);
    }

    #[test]
    fn test_bucket_counts_sum_to_district_totals() {
        let sales: Vec<PropertySale> = (0..500)
            .map(|i| sale(i % 5, 2000 + (i % 13) as i32, 1 + (i % 12) as u32))
            .collect();
        let counts = monthly_sales_counts(&sales);
        for district in 0..5 {
            let bucket_total: usize = counts
                .iter()
                .filter(|((d, _, _), _)| *d == district)
                .map(|(_, count)| count)
                .sum();
            let direct = sales.iter().filter(|s| s.district == district).count();
            assert_eq!(bucket_total, direct);
        }
    }
}
