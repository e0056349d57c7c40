// One refresh: fetch -> parse -> aggregate -> derive.
//
// Every refresh builds a brand-new `Dashboard`; nothing from an earlier
// refresh is reused or patched. A caller that fires overlapping refreshes
// keeps whichever result it asked for last.
use crate::aggregate::{self, find_country, ranked_count, summarize_countries};
use crate::cache::ObservationCache;
use crate::config::{AppConfig, ColumnConfig};
use crate::error::{FormatError, SourceError};
use crate::loader::{load_and_clean, LoadReport};
use crate::metrics::{compute_kpis, regional_summaries};
use crate::regions::RegionTable;
use crate::source::SourceChain;
use crate::types::{CountrySummary, KpiSet, Observation, RegionSummary};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub observations: Vec<Observation>,
    pub countries: Vec<CountrySummary>,
    pub regions: Vec<RegionSummary>,
    pub kpis: Option<KpiSet>,
    pub generated_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn build(observations: Vec<Observation>) -> Self {
        let countries = summarize_countries(&observations);
        let regions = regional_summaries(&countries);
        let kpis = compute_kpis(&countries);
        Self {
            observations,
            countries,
            regions,
            kpis,
            generated_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::build(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn top_performers(&self, count: usize) -> Vec<CountrySummary> {
        aggregate::top_performers(&self.countries, count)
    }

    pub fn bottom_performers(&self, count: usize) -> Vec<CountrySummary> {
        aggregate::bottom_performers(&self.countries, count)
    }

    pub fn major_countries(&self, names: &[String]) -> Vec<CountrySummary> {
        aggregate::major_countries(&self.countries, names)
    }

    /// Summary, history and global rank of one country, by source name.
    pub fn country_detail(&self, country: &str) -> Option<CountryDetail> {
        let summary = find_country(&self.countries, country)?.clone();
        let mut history: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| o.country == country)
            .cloned()
            .collect();
        history.sort_by_key(|o| o.year);
        Some(CountryDetail {
            rank: summary.rank,
            ranked_total: ranked_count(&self.countries),
            summary,
            history,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CountryDetail {
    pub summary: CountrySummary,
    /// Oldest year first.
    pub history: Vec<Observation>,
    pub rank: Option<usize>,
    pub ranked_total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataOrigin {
    Cache,
    Source { location: String, attempt: usize },
    /// Every source failed; the dashboard is empty.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub dashboard: Dashboard,
    pub origin: DataOrigin,
    pub report: Option<LoadReport>,
}

pub struct Pipeline {
    chain: SourceChain,
    columns: ColumnConfig,
    regions: RegionTable,
    cache: Option<ObservationCache>,
}

impl Pipeline {
    pub fn new(
        chain: SourceChain,
        columns: ColumnConfig,
        regions: RegionTable,
        cache: Option<ObservationCache>,
    ) -> Self {
        Self {
            chain,
            columns,
            regions,
            cache,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let cache = config
            .cache
            .enabled
            .then(|| ObservationCache::from_config(&config.cache));
        Ok(Self::new(
            SourceChain::from_config(config)?,
            config.columns.clone(),
            RegionTable::from_groups(&config.regions),
            cache,
        ))
    }

    pub fn cache(&self) -> Option<&ObservationCache> {
        self.cache.as_ref()
    }

    /// Run a refresh. With `force` the cache is skipped.
    ///
    /// Source failures never surface: if no source answers, the outcome
    /// carries an empty dashboard. A source that answers with text that is
    /// not a usable CSV is a `FormatError`.
    pub fn refresh(&self, force: bool) -> Result<RefreshOutcome, FormatError> {
        if !force {
            if let Some(data) = self.cache.as_ref().and_then(ObservationCache::load) {
                info!(records = data.len(), "using cached observations");
                return Ok(RefreshOutcome {
                    dashboard: Dashboard::build(data),
                    origin: DataOrigin::Cache,
                    report: None,
                });
            }
        }

        let fetched = match self.chain.fetch() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "continuing with an empty dataset");
                return Ok(RefreshOutcome {
                    dashboard: Dashboard::empty(),
                    origin: DataOrigin::Unavailable,
                    report: None,
                });
            }
        };

        let (data, report) = load_and_clean(&fetched.text, &self.columns, &self.regions)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&data) {
                warn!(error = %e, "could not write cache");
            }
        }
        let dashboard = Dashboard::build(data);
        info!(
            observations = dashboard.observations.len(),
            countries = dashboard.countries.len(),
            regions = dashboard.regions.len(),
            "dashboard rebuilt"
        );
        Ok(RefreshOutcome {
            dashboard,
            origin: DataOrigin::Source {
                location: fetched.location,
                attempt: fetched.attempt,
            },
            report: Some(report),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::StubSource;
    use crate::source::CsvSource;
    use chrono::Duration;

    const CSV: &str = "country,year,iso_code,renewables_share_elec\n\
        Germany,2023,DEU,55.0\n\
        Germany,2018,DEU,40.0\n\
        Norway,2023,NOR,90.0\n\
        Poland,2023,POL,10.0\n\
        World,2023,WOR,30.0\n";

    fn pipeline(sources: Vec<Box<dyn CsvSource>>, cache: Option<ObservationCache>) -> Pipeline {
        let config = AppConfig::from_toml_str("").unwrap();
        Pipeline::new(
            SourceChain::new(sources),
            config.columns,
            RegionTable::from_groups(&config.regions),
            cache,
        )
    }

    #[test]
    fn end_to_end_refresh() {
        let p = pipeline(vec![Box::new(StubSource::ok("primary", CSV))], None);
        let out = p.refresh(false).unwrap();
        let d = &out.dashboard;
        assert_eq!(d.observations.len(), 4);
        assert_eq!(d.countries.len(), 3);
        assert!(d.countries.iter().all(|c| c.country != "World"));

        let germany = find_country(&d.countries, "Germany").unwrap();
        assert_eq!(germany.latest_value, Some(55.0));
        assert_eq!(germany.growth_rate, Some(15.0));
        assert_eq!(germany.rank, Some(2));

        let kpis = d.kpis.as_ref().unwrap();
        assert_eq!(kpis.above_eighty_count, 1);
        assert_eq!(kpis.below_twenty_count, 1);
        assert_eq!(kpis.global_average, 51.7);
        assert_eq!(kpis.fastest_growing.country, "Germany");

        assert_eq!(d.regions.len(), 1);
        assert_eq!(d.regions[0].name, "Europe");
        assert_eq!(out.report.unwrap().accepted_rows, 4);
    }

    #[test]
    fn fallback_content_is_used_when_primary_fails() {
        let fallback = "country,year,iso_code,renewables_share_elec\nChile,2023,CHL,62.0\n";
        let p = pipeline(
            vec![
                Box::new(StubSource::failing("primary")),
                Box::new(StubSource::ok("fallback", fallback)),
            ],
            None,
        );
        let out = p.refresh(false).unwrap();
        assert_eq!(
            out.origin,
            DataOrigin::Source {
                location: "fallback".to_string(),
                attempt: 1
            }
        );
        assert_eq!(out.dashboard.countries.len(), 1);
        assert_eq!(out.dashboard.countries[0].country, "Chile");
    }

    #[test]
    fn unavailable_sources_give_an_empty_dashboard() {
        let p = pipeline(
            vec![
                Box::new(StubSource::failing("primary")),
                Box::new(StubSource::failing("fallback")),
            ],
            None,
        );
        let out = p.refresh(false).unwrap();
        assert_eq!(out.origin, DataOrigin::Unavailable);
        assert!(out.dashboard.is_empty());
        assert!(out.dashboard.countries.is_empty());
        assert!(out.dashboard.regions.is_empty());
        assert!(out.dashboard.kpis.is_none());
    }

    #[test]
    fn header_only_source_aborts_the_refresh() {
        let p = pipeline(
            vec![Box::new(StubSource::ok(
                "primary",
                "country,year,iso_code,renewables_share_elec\n",
            ))],
            None,
        );
        assert!(matches!(p.refresh(false), Err(FormatError::EmptyData)));
    }

    #[test]
    fn cache_is_used_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        let source = StubSource::ok("primary", CSV);
        let calls = source.calls.clone();
        let p = pipeline(
            vec![Box::new(source)],
            Some(ObservationCache::new(&cache_path, Duration::hours(24))),
        );

        let first = p.refresh(false).unwrap();
        assert!(matches!(first.origin, DataOrigin::Source { .. }));
        let second = p.refresh(false).unwrap();
        assert_eq!(second.origin, DataOrigin::Cache);
        assert_eq!(second.dashboard.observations, first.dashboard.observations);
        assert_eq!(calls.get(), 1);

        p.refresh(true).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn country_detail_uses_computed_rank() {
        let d = Dashboard::build(
            load_and_clean(
                CSV,
                &AppConfig::from_toml_str("").unwrap().columns,
                &RegionTable::default(),
            )
            .unwrap()
            .0,
        );
        let detail = d.country_detail("Germany").unwrap();
        assert_eq!(detail.rank, Some(2));
        assert_eq!(detail.ranked_total, 3);
        let years: Vec<i32> = detail.history.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2018, 2023]);
        assert!(d.country_detail("Atlantis").is_none());
    }

    #[test]
    fn performers_and_major_countries() {
        let d = Dashboard::build(
            load_and_clean(
                CSV,
                &AppConfig::from_toml_str("").unwrap().columns,
                &RegionTable::default(),
            )
            .unwrap()
            .0,
        );
        assert_eq!(d.top_performers(1)[0].country, "Norway");
        assert_eq!(d.bottom_performers(1)[0].country, "Poland");
        let names = vec!["Poland".to_string(), "France".to_string(), "Germany".to_string()];
        let majors: Vec<String> = d.major_countries(&names).into_iter().map(|s| s.country).collect();
        assert_eq!(majors, vec!["Poland", "Germany"]);
    }
}
