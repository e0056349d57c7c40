use crate::pipeline::Dashboard;
use crate::store::StoredRecord;
use crate::types::{
    CountryRankingRow, CountrySummary, HistoryRow, KpiRow, Observation, PerformerRow, RegionRow,
    SummaryStats,
};
use crate::util::{format_change, format_int, format_percent, PLACEHOLDER};

/// Ranked countries first (by rank), then any unranked ones.
pub fn country_ranking(dashboard: &Dashboard) -> Vec<CountryRankingRow> {
    let mut list: Vec<&CountrySummary> = dashboard.countries.iter().collect();
    list.sort_by_key(|s| s.rank.unwrap_or(usize::MAX));
    list.into_iter().map(country_row).collect()
}

fn country_row(s: &CountrySummary) -> CountryRankingRow {
    CountryRankingRow {
        rank: s
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        country: s.country.clone(),
        region: s.region.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        latest_year: s.latest_year,
        renewable_share: format_percent(s.latest_value),
        five_year_change: format_change(s.growth_rate),
    }
}

pub fn major_countries(dashboard: &Dashboard, names: &[String]) -> Vec<CountryRankingRow> {
    dashboard
        .major_countries(names)
        .iter()
        .map(country_row)
        .collect()
}

pub fn regional_summary(dashboard: &Dashboard) -> Vec<RegionRow> {
    dashboard
        .regions
        .iter()
        .map(|r| RegionRow {
            region: r.name.clone(),
            average: format_percent(Some(r.average)),
            latest_year: r.latest_year,
            num_countries: r.countries.len(),
        })
        .collect()
}

pub fn performers(dashboard: &Dashboard, count: usize) -> Vec<PerformerRow> {
    let top = dashboard.top_performers(count);
    let bottom = dashboard.bottom_performers(count);
    let rows = |group: &str, list: Vec<CountrySummary>| -> Vec<PerformerRow> {
        list.into_iter()
            .enumerate()
            .map(|(idx, s)| PerformerRow {
                group: group.to_string(),
                position: idx + 1,
                country: s.country,
                renewable_share: format_percent(s.latest_value),
                latest_year: s.latest_year,
            })
            .collect()
    };
    let mut out = rows("Top", top);
    out.extend(rows("Bottom", bottom));
    out
}

pub fn kpi_rows(stats: &SummaryStats) -> Vec<KpiRow> {
    let row = |metric: &str, value: &str| KpiRow {
        metric: metric.to_string(),
        value: value.to_string(),
    };
    vec![
        row("Global Average", &stats.global_average),
        row("Above 80% Countries", &stats.above_eighty_count),
        row("Below 20% Countries", &stats.below_twenty_count),
        row("Average 5-Year Growth", &stats.growth_rate),
        row("Total Countries", &stats.total_countries),
        row(
            "Fastest Growing",
            &format!("{} ({})", stats.fastest_growing, stats.fastest_growth),
        ),
    ]
}

/// Render the KPIs for display and export; an empty dataset renders
/// every metric as the placeholder.
pub fn generate_summary(dashboard: &Dashboard) -> SummaryStats {
    let total_observations = dashboard.observations.len();
    match dashboard.kpis.as_ref() {
        Some(k) => SummaryStats {
            global_average: format_percent(Some(k.global_average)),
            above_eighty_count: format_int(k.above_eighty_count),
            below_twenty_count: format_int(k.below_twenty_count),
            growth_rate: format_change(Some(k.growth_rate)),
            total_countries: format_int(k.total_countries),
            fastest_growing: k.fastest_growing.country.clone(),
            fastest_growth: format_change(Some(k.fastest_growing.growth)),
            total_observations,
        },
        None => {
            let p = || PLACEHOLDER.to_string();
            SummaryStats {
                global_average: p(),
                above_eighty_count: p(),
                below_twenty_count: p(),
                growth_rate: p(),
                total_countries: p(),
                fastest_growing: p(),
                fastest_growth: p(),
                total_observations,
            }
        }
    }
}

fn history_row(
    year: i32,
    country: &str,
    code: Option<&str>,
    share: Option<f64>,
    region: Option<&str>,
) -> HistoryRow {
    HistoryRow {
        year,
        country: country.to_string(),
        code: code.unwrap_or(PLACEHOLDER).to_string(),
        renewable_share: format_percent(share),
        region: region.unwrap_or(PLACEHOLDER).to_string(),
    }
}

pub fn observation_rows(history: &[Observation]) -> Vec<HistoryRow> {
    history
        .iter()
        .map(|o| {
            history_row(
                o.year,
                &o.country,
                o.country_code.as_deref(),
                o.renewable_share,
                o.region.as_deref(),
            )
        })
        .collect()
}

pub fn stored_rows(records: &[&StoredRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| {
            history_row(
                r.year,
                &r.country,
                r.country_code.as_deref(),
                r.renewable_share,
                r.region.as_deref(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    fn obs(country: &str, year: i32, share: f64, region: Option<&str>) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: Some("XXX".to_string()),
            year,
            renewable_share: Some(share),
            region: region.map(str::to_string),
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::build(vec![
            obs("Germany", 2023, 55.0, Some("Europe")),
            obs("Germany", 2018, 40.0, Some("Europe")),
            obs("Norway", 2023, 90.0, Some("Europe")),
            obs("Kosovo", 2023, 5.0, None),
        ])
    }

    #[test]
    fn ranking_rows_render_placeholders() {
        let rows = country_ranking(&dashboard());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].country, "Norway");
        assert_eq!(rows[0].rank, "1");
        assert_eq!(rows[0].five_year_change, PLACEHOLDER);
        assert_eq!(rows[1].renewable_share, "55.0%");
        assert_eq!(rows[1].five_year_change, "+15.0 pp");
        assert_eq!(rows[2].region, PLACEHOLDER);
    }

    #[test]
    fn performer_rows_cover_both_ends() {
        let rows = performers(&dashboard(), 2);
        let groups: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.group.as_str(), r.country.as_str()))
            .collect();
        assert_eq!(
            groups,
            vec![("Top", "Norway"), ("Top", "Germany"), ("Bottom", "Kosovo"), ("Bottom", "Germany")]
        );
    }

    #[test]
    fn region_rows() {
        let rows = regional_summary(&dashboard());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].average, "72.5%");
        assert_eq!(rows[0].num_countries, 2);
    }

    #[test]
    fn empty_dataset_renders_placeholders() {
        let empty = Dashboard::empty();
        let summary = generate_summary(&empty);
        let rows = kpi_rows(&summary);
        assert!(rows[..5].iter().all(|r| r.value == PLACEHOLDER));
        assert_eq!(summary.global_average, PLACEHOLDER);
        assert_eq!(summary.total_observations, 0);
        assert!(country_ranking(&empty).is_empty());
    }

    #[test]
    fn summary_renders_kpis() {
        let summary = generate_summary(&dashboard());
        assert_eq!(summary.global_average, "50.0%");
        assert_eq!(summary.above_eighty_count, "1");
        assert_eq!(summary.below_twenty_count, "1");
        assert_eq!(summary.fastest_growing, "Germany");
        assert_eq!(summary.fastest_growth, "+15.0 pp");
    }

    #[test]
    fn history_rows_fill_missing_fields() {
        let mut store = RecordStore::new();
        store.replace_all(&[obs("Kosovo", 2023, 5.0, None)]);
        let rows = stored_rows(&store.by_year(2023));
        assert_eq!(rows[0].region, PLACEHOLDER);
        assert_eq!(rows[0].code, "XXX");
        assert_eq!(rows[0].renewable_share, "5.0%");

        let rows = observation_rows(&[obs("Chile", 2020, 48.26, Some("South America"))]);
        assert_eq!(rows[0].renewable_share, "48.3%");
        assert_eq!(rows[0].region, "South America");
    }
}
