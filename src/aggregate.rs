// Per-country aggregation and ranking.
use crate::types::{CountrySummary, Observation};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// How far back the growth delta looks, in years.
pub const GROWTH_WINDOW_YEARS: i32 = 5;

/// One summary per country with at least one observation carrying a share.
///
/// Summaries come out in order of each country's first appearance, with
/// ranks already assigned.
pub fn summarize_countries(data: &[Observation]) -> Vec<CountrySummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Observation>> = HashMap::new();
    for obs in data {
        if obs.country.is_empty() {
            continue;
        }
        groups
            .entry(obs.country.as_str())
            .or_insert_with(|| {
                order.push(obs.country.as_str());
                Vec::new()
            })
            .push(obs);
    }

    let mut summaries: Vec<CountrySummary> = order
        .into_iter()
        .filter_map(|country| summarize_one(country, &groups[country]))
        .collect();
    assign_ranks(&mut summaries);

    debug!(
        countries = summaries.len(),
        observations = data.len(),
        "aggregated country summaries"
    );
    summaries
}

fn summarize_one(country: &str, history: &[&Observation]) -> Option<CountrySummary> {
    let mut valid: Vec<(i32, f64, Option<&str>)> = history
        .iter()
        .filter_map(|o| o.renewable_share.map(|v| (o.year, v, o.region.as_deref())))
        .collect();
    // Stable, so the first row wins among duplicates of the same year.
    valid.sort_by(|a, b| b.0.cmp(&a.0));

    let &(latest_year, latest_value, region) = valid.first()?;
    let growth_rate = valid
        .iter()
        .find(|(year, _, _)| *year <= latest_year - GROWTH_WINDOW_YEARS)
        .map(|(_, past, _)| latest_value - past);

    Some(CountrySummary {
        country: country.to_string(),
        latest_year,
        latest_value: Some(latest_value),
        rank: None,
        growth_rate,
        region: region.map(str::to_string),
    })
}

fn by_value_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Rank 1 is the highest latest value; ties keep their input order.
/// Summaries without a value are left unranked.
pub fn assign_ranks(summaries: &mut [CountrySummary]) {
    let mut ranked: Vec<(usize, f64)> = summaries
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.latest_value.map(|v| (i, v)))
        .collect();
    ranked.sort_by(|a, b| by_value_desc(a.1, b.1));

    for s in summaries.iter_mut() {
        s.rank = None;
    }
    for (position, (i, _)) in ranked.into_iter().enumerate() {
        summaries[i].rank = Some(position + 1);
    }
}

fn valued(summaries: &[CountrySummary]) -> Vec<(&CountrySummary, f64)> {
    summaries
        .iter()
        .filter_map(|s| s.latest_value.map(|v| (s, v)))
        .collect()
}

pub fn top_performers(summaries: &[CountrySummary], count: usize) -> Vec<CountrySummary> {
    let mut list = valued(summaries);
    list.sort_by(|a, b| by_value_desc(a.1, b.1));
    list.into_iter().take(count).map(|(s, _)| s.clone()).collect()
}

pub fn bottom_performers(summaries: &[CountrySummary], count: usize) -> Vec<CountrySummary> {
    let mut list = valued(summaries);
    list.sort_by(|a, b| by_value_desc(b.1, a.1));
    list.into_iter().take(count).map(|(s, _)| s.clone()).collect()
}

/// Summaries for `names`, in that order, skipping names with no data.
pub fn major_countries(summaries: &[CountrySummary], names: &[String]) -> Vec<CountrySummary> {
    names
        .iter()
        .filter_map(|name| summaries.iter().find(|s| &s.country == name))
        .cloned()
        .collect()
}

pub fn find_country<'a>(
    summaries: &'a [CountrySummary],
    country: &str,
) -> Option<&'a CountrySummary> {
    summaries.iter().find(|s| s.country == country)
}

/// Number of summaries that carry a rank.
pub fn ranked_count(summaries: &[CountrySummary]) -> usize {
    summaries.iter().filter(|s| s.rank.is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, share: Option<f64>) -> Observation {
        Observation {
            country: country.to_string(),
            country_code: Some("XXX".to_string()),
            year,
            renewable_share: share,
            region: Some("Europe".to_string()),
        }
    }

    fn summary(country: &str, value: Option<f64>) -> CountrySummary {
        CountrySummary {
            country: country.to_string(),
            latest_year: 2023,
            latest_value: value,
            rank: None,
            growth_rate: None,
            region: None,
        }
    }

    #[test]
    fn latest_value_and_five_year_growth() {
        let data = vec![obs("Germany", 2023, Some(55.0)), obs("Germany", 2018, Some(40.0))];
        let out = summarize_countries(&data);
        assert_eq!(out.len(), 1);
        let germany = &out[0];
        assert_eq!(germany.country, "Germany");
        assert_eq!(germany.latest_year, 2023);
        assert_eq!(germany.latest_value, Some(55.0));
        assert_eq!(germany.growth_rate, Some(15.0));
        assert_eq!(germany.rank, Some(1));
        assert_eq!(germany.region.as_deref(), Some("Europe"));
    }

    #[test]
    fn growth_uses_nearest_year_at_or_before_window() {
        let data = vec![
            obs("Spain", 2015, Some(30.0)),
            obs("Spain", 2023, Some(50.0)),
            obs("Spain", 2019, Some(38.0)),
            obs("Spain", 2017, Some(33.0)),
        ];
        let out = summarize_countries(&data);
        // 2019 is inside the window, 2017 is the nearest year <= 2018.
        assert_eq!(out[0].growth_rate, Some(17.0));
    }

    #[test]
    fn growth_is_absent_without_old_enough_history() {
        let data = vec![obs("Chile", 2023, Some(60.0)), obs("Chile", 2019, Some(45.0))];
        let out = summarize_countries(&data);
        assert_eq!(out[0].growth_rate, None);
    }

    #[test]
    fn absent_shares_are_ignored_and_empty_countries_dropped() {
        let data = vec![
            obs("Peru", 2023, None),
            obs("Peru", 2021, Some(61.0)),
            obs("Mali", 2022, None),
        ];
        let out = summarize_countries(&data);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].country, "Peru");
        assert_eq!(out[0].latest_year, 2021);
    }

    #[test]
    fn ranks_are_dense_and_descending() {
        let data = vec![
            obs("A", 2023, Some(20.0)),
            obs("B", 2023, Some(90.0)),
            obs("C", 2023, Some(55.0)),
            obs("D", 2023, Some(55.0)),
        ];
        let out = summarize_countries(&data);
        let rank_of = |c: &str| find_country(&out, c).and_then(|s| s.rank);
        assert_eq!(rank_of("B"), Some(1));
        assert_eq!(rank_of("C"), Some(2));
        assert_eq!(rank_of("D"), Some(3));
        assert_eq!(rank_of("A"), Some(4));

        let mut ranks: Vec<usize> = out.iter().filter_map(|s| s.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(ranked_count(&out), 4);
    }

    #[test]
    fn unvalued_summaries_stay_unranked() {
        let mut list = vec![summary("A", None), summary("B", Some(10.0)), summary("C", Some(30.0))];
        assign_ranks(&mut list);
        assert_eq!(list[0].rank, None);
        assert_eq!(list[1].rank, Some(2));
        assert_eq!(list[2].rank, Some(1));
    }

    #[test]
    fn performers_are_sorted_and_truncated() {
        let list = vec![
            summary("A", Some(10.0)),
            summary("B", Some(90.0)),
            summary("C", None),
            summary("D", Some(50.0)),
        ];
        let top: Vec<String> = top_performers(&list, 2).into_iter().map(|s| s.country).collect();
        assert_eq!(top, vec!["B", "D"]);
        let bottom: Vec<String> = bottom_performers(&list, 5).into_iter().map(|s| s.country).collect();
        assert_eq!(bottom, vec!["A", "D", "B"]);
    }

    #[test]
    fn major_countries_keep_configured_order() {
        let list = vec![summary("France", Some(25.0)), summary("China", Some(30.0))];
        let names = vec!["China".to_string(), "Japan".to_string(), "France".to_string()];
        let out: Vec<String> = major_countries(&list, &names).into_iter().map(|s| s.country).collect();
        assert_eq!(out, vec!["China", "France"]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(summarize_countries(&[]).is_empty());
    }
}
