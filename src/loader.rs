// CSV text -> validated observations.
//
// Columns are located by header name, so column order in the source does
// not matter. Rows that fail any acceptance check are dropped and counted;
// only a header without the required columns, or a file with no data rows,
// fails the whole load. Years may carry a zero fraction (`2023.0`); shares
// must be plain decimals, so `5,5` is rejected rather than read as `55`.
use crate::config::ColumnConfig;
use crate::error::FormatError;
use crate::regions::RegionTable;
use crate::types::Observation;
use crate::util::{is_null_marker, parse_f64_safe, parse_i32_safe};
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, trace};

pub const MIN_YEAR: i32 = 1990;
pub const MAX_YEAR: i32 = 2025;
pub const CODE_LEN: usize = 3;

/// Why a row was left out of the observation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowRejection {
    Malformed,
    ShortRow,
    EmptyCountry,
    AggregateEntity,
    BadYear,
    BadCode,
    MissingShare,
    BadShare,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowRejection::Malformed => "malformed row",
            RowRejection::ShortRow => "missing fields",
            RowRejection::EmptyCountry => "empty country",
            RowRejection::AggregateEntity => "aggregate entity",
            RowRejection::BadYear => "year out of range",
            RowRejection::BadCode => "no 3-character code",
            RowRejection::MissingShare => "no share value",
            RowRejection::BadShare => "share out of range",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected: BTreeMap<RowRejection, usize>,
}

impl LoadReport {
    pub fn rejected_rows(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    country: usize,
    year: usize,
    code: usize,
    share: usize,
}

impl ColumnIndex {
    fn locate(header: &StringRecord, columns: &ColumnConfig) -> Result<Self, FormatError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let wanted = [
            (&columns.country, find(columns.country.as_str())),
            (&columns.year, find(columns.year.as_str())),
            (&columns.code, find(columns.code.as_str())),
            (&columns.share, find(columns.share.as_str())),
        ];
        let missing: Vec<String> = wanted
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        match wanted {
            [(_, Some(country)), (_, Some(year)), (_, Some(code)), (_, Some(share))] => Ok(Self {
                country,
                year,
                code,
                share,
            }),
            _ => Err(FormatError::MissingColumns { missing }),
        }
    }
}

/// Names that stand for a grouping of countries rather than one country.
pub fn is_aggregate_entity(country: &str) -> bool {
    country == "World" || country.contains('(') || country.contains("Ember")
}

fn clean_row(
    record: &StringRecord,
    idx: ColumnIndex,
    regions: &RegionTable,
) -> Result<Observation, RowRejection> {
    let (Some(country), Some(year), Some(code), Some(share)) = (
        record.get(idx.country),
        record.get(idx.year),
        record.get(idx.code),
        record.get(idx.share),
    ) else {
        return Err(RowRejection::ShortRow);
    };

    let country = country.trim();
    if country.is_empty() {
        return Err(RowRejection::EmptyCountry);
    }
    if is_aggregate_entity(country) {
        return Err(RowRejection::AggregateEntity);
    }

    let year = match parse_i32_safe(Some(year)) {
        Some(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => y,
        _ => return Err(RowRejection::BadYear),
    };

    let code = code.trim();
    if code.chars().count() != CODE_LEN {
        return Err(RowRejection::BadCode);
    }

    // Downstream stages need a number, so an absent share drops the row.
    if is_null_marker(Some(share)) {
        return Err(RowRejection::MissingShare);
    }
    let share = match parse_f64_safe(Some(share)) {
        Some(v) if (0.0..=100.0).contains(&v) => v,
        _ => return Err(RowRejection::BadShare),
    };

    Ok(Observation {
        country: country.to_string(),
        country_code: Some(code.to_string()),
        year,
        renewable_share: Some(share),
        region: regions.region_for(country).map(str::to_string),
    })
}

pub fn load_and_clean(
    text: &str,
    columns: &ColumnConfig,
    regions: &RegionTable,
) -> Result<(Vec<Observation>, LoadReport), FormatError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let idx = ColumnIndex::locate(rdr.headers()?, columns)?;

    let mut report = LoadReport::default();
    let mut data: Vec<Observation> = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        report.total_rows += 1;
        let outcome = match result {
            Ok(record) => clean_row(&record, idx, regions),
            Err(_) => Err(RowRejection::Malformed),
        };
        match outcome {
            Ok(obs) => data.push(obs),
            Err(reason) => {
                trace!(row = line + 2, %reason, "row rejected");
                *report.rejected.entry(reason).or_insert(0) += 1;
            }
        }
    }

    if report.total_rows == 0 {
        return Err(FormatError::EmptyData);
    }

    report.accepted_rows = data.len();
    info!(
        total = report.total_rows,
        accepted = report.accepted_rows,
        rejected = report.rejected_rows(),
        "parsed renewable share CSV"
    );
    for (reason, count) in &report.rejected {
        info!(%reason, count, "rows rejected");
    }
    Ok((data, report))
}
