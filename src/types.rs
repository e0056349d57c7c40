use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One country-year data point that survived parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub country: String,
    pub country_code: Option<String>,
    pub year: i32,
    pub renewable_share: Option<f64>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country: String,
    pub latest_year: i32,
    pub latest_value: Option<f64>,
    pub rank: Option<usize>,
    pub growth_rate: Option<f64>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub name: String,
    pub average: f64,
    pub latest_year: i32,
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FastestGrowing {
    pub country: String,
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub global_average: f64,
    pub above_eighty_count: usize,
    pub below_twenty_count: usize,
    pub growth_rate: f64,
    pub total_countries: usize,
    pub fastest_growing: FastestGrowing,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountryRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "LatestYear")]
    #[tabled(rename = "LatestYear")]
    pub latest_year: i32,
    #[serde(rename = "RenewableShare")]
    #[tabled(rename = "RenewableShare")]
    pub renewable_share: String,
    #[serde(rename = "FiveYearChange")]
    #[tabled(rename = "FiveYearChange")]
    pub five_year_change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Average")]
    #[tabled(rename = "Average")]
    pub average: String,
    #[serde(rename = "LatestYear")]
    #[tabled(rename = "LatestYear")]
    pub latest_year: i32,
    #[serde(rename = "NumCountries")]
    #[tabled(rename = "NumCountries")]
    pub num_countries: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PerformerRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Position")]
    #[tabled(rename = "Position")]
    pub position: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "RenewableShare")]
    #[tabled(rename = "RenewableShare")]
    pub renewable_share: String,
    #[serde(rename = "LatestYear")]
    #[tabled(rename = "LatestYear")]
    pub latest_year: i32,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// What ends up in `summary.json`. Every field is a rendered string so an
/// empty dataset exports placeholders instead of `NaN`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub global_average: String,
    pub above_eighty_count: String,
    pub below_twenty_count: String,
    pub growth_rate: String,
    pub total_countries: String,
    pub fastest_growing: String,
    pub fastest_growth: String,
    pub total_observations: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct HistoryRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "RenewableShare")]
    pub renewable_share: String,
    #[tabled(rename = "Region")]
    pub region: String,
}
