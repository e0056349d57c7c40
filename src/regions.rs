use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Immutable country -> region lookup, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    by_country: HashMap<String, String>,
}

impl RegionTable {
    /// A country listed under several regions keeps the first one
    /// in region-name order.
    pub fn from_groups(groups: &BTreeMap<String, Vec<String>>) -> Self {
        let mut by_country = HashMap::new();
        for (region, countries) in groups {
            for country in countries {
                if let Some(existing) = by_country.get(country) {
                    warn!(%country, %existing, ignored = %region, "country listed in two regions");
                    continue;
                }
                by_country.insert(country.clone(), region.clone());
            }
        }
        Self { by_country }
    }

    pub fn region_for(&self, country: &str) -> Option<&str> {
        self.by_country.get(country).map(String::as_str)
    }
}
