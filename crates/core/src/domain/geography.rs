use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContinentId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    pub region_id: Option<RegionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub continent_id: Option<ContinentId>,
}

/// Read-only reference snapshot of the region -> continent -> country tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyHierarchy {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub continents: Vec<Continent>,
    #[serde(default)]
    pub countries: Vec<Country>,
}

/// A policy's geography rules: three additive allow-lists and one
/// subtractive disabled-country list applied after expansion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyGeography {
    #[serde(default)]
    pub region_ids: BTreeSet<RegionId>,
    #[serde(default)]
    pub continent_ids: BTreeSet<ContinentId>,
    #[serde(default)]
    pub country_ids: BTreeSet<CountryId>,
    #[serde(default)]
    pub disabled_country_ids: BTreeSet<CountryId>,
}

impl PolicyGeography {
    /// Whether any allow-list is configured. An empty expansion result is
    /// only meaningful when this is true; with no allow rules at all the
    /// caller decides what "unrestricted" means.
    pub fn has_allow_rules(&self) -> bool {
        !self.region_ids.is_empty()
            || !self.continent_ids.is_empty()
            || !self.country_ids.is_empty()
    }
}
