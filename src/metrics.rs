use crate::types::{CountrySummary, FastestGrowing, KpiSet, RegionSummary};
use crate::util::{average, round1};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const HIGH_SHARE_THRESHOLD: f64 = 80.0;
pub const LOW_SHARE_THRESHOLD: f64 = 20.0;

/// Headline metrics over every summary with a latest value.
///
/// Returns `None` when no summary has a value, since there is no
/// meaningful global average to report.
pub fn compute_kpis(summaries: &[CountrySummary]) -> Option<KpiSet> {
    let values: Vec<f64> = summaries.iter().filter_map(|s| s.latest_value).collect();
    if values.is_empty() {
        return None;
    }

    let above_eighty_count = values.iter().filter(|v| **v >= HIGH_SHARE_THRESHOLD).count();
    let below_twenty_count = values.iter().filter(|v| **v < LOW_SHARE_THRESHOLD).count();

    let growth: Vec<(&str, f64)> = summaries
        .iter()
        .filter_map(|s| s.growth_rate.map(|g| (s.country.as_str(), g)))
        .collect();
    let growth_values: Vec<f64> = growth.iter().map(|(_, g)| *g).collect();

    // First maximum wins on ties.
    let fastest_growing = growth
        .iter()
        .copied()
        .reduce(|best, current| if current.1 > best.1 { current } else { best })
        .map(|(country, g)| FastestGrowing {
            country: country.to_string(),
            growth: round1(g),
        })
        .unwrap_or_else(|| FastestGrowing {
            country: "N/A".to_string(),
            growth: 0.0,
        });

    Some(KpiSet {
        global_average: round1(average(&values)),
        above_eighty_count,
        below_twenty_count,
        growth_rate: round1(average(&growth_values)),
        total_countries: values.len(),
        fastest_growing,
    })
}

/// Roll summaries up by region, highest average first.
///
/// Summaries without a region or without a latest value are left out.
pub fn regional_summaries(summaries: &[CountrySummary]) -> Vec<RegionSummary> {
    #[derive(Default)]
    struct Acc {
        values: Vec<f64>,
        latest_year: i32,
        countries: Vec<String>,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for s in summaries {
        let (Some(region), Some(value)) = (s.region.as_deref(), s.latest_value) else {
            continue;
        };
        let e = map.entry(region).or_insert_with(|| {
            order.push(region);
            Acc {
                latest_year: i32::MIN,
                ..Acc::default()
            }
        });
        e.values.push(value);
        e.latest_year = e.latest_year.max(s.latest_year);
        e.countries.push(s.country.clone());
    }

    let mut rows: Vec<RegionSummary> = order
        .into_iter()
        .filter_map(|name| {
            let acc = map.remove(name)?;
            Some(RegionSummary {
                name: name.to_string(),
                average: round1(average(&acc.values)),
                latest_year: acc.latest_year,
                countries: acc.countries,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap_or(Ordering::Equal));
    rows
}
