// In-memory record store behind the country/year lookups.
//
// Writes are whole-collection replacements: `replace_all` clears the map
// and both indices before inserting, so readers never see a mix of two
// imports.
use crate::types::Observation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Uuid,
    pub country: String,
    pub country_code: Option<String>,
    pub year: i32,
    pub renewable_share: Option<f64>,
    pub region: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<Uuid, StoredRecord>,
    insertion: Vec<Uuid>,
    by_country: HashMap<String, Vec<Uuid>>,
    by_year: BTreeMap<i32, Vec<Uuid>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.insertion.clear();
        self.by_country.clear();
        self.by_year.clear();
    }

    /// Drop everything and store `data`; returns the stored records in
    /// input order.
    pub fn replace_all(&mut self, data: &[Observation]) -> Vec<StoredRecord> {
        self.clear();
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(data.len());
        for obs in data {
            let record = StoredRecord {
                id: Uuid::new_v4(),
                country: obs.country.clone(),
                country_code: obs.country_code.clone(),
                year: obs.year,
                renewable_share: obs.renewable_share,
                region: obs.region.clone(),
                last_updated: now,
            };
            self.insertion.push(record.id);
            self.by_country
                .entry(record.country.clone())
                .or_default()
                .push(record.id);
            self.by_year.entry(record.year).or_default().push(record.id);
            self.records.insert(record.id, record.clone());
            inserted.push(record);
        }
        info!(records = inserted.len(), "record store replaced");
        inserted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn all(&self) -> Vec<&StoredRecord> {
        self.resolve(&self.insertion)
    }

    pub fn by_country(&self, country: &str) -> Vec<&StoredRecord> {
        self.by_country
            .get(country)
            .map(|ids| self.resolve(ids))
            .unwrap_or_default()
    }

    pub fn by_year(&self, year: i32) -> Vec<&StoredRecord> {
        self.by_year
            .get(&year)
            .map(|ids| self.resolve(ids))
            .unwrap_or_default()
    }

    /// Years that have at least one record, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }

    fn resolve(&self, ids: &[Uuid]) -> Vec<&StoredRecord> {
        ids.iter().filter_map(|id| self.records.get(id)).collect()
    }
}
