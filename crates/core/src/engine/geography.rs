use std::collections::{BTreeSet, HashMap};

use crate::domain::geography::{ContinentId, CountryId, GeographyHierarchy, PolicyGeography, RegionId};

pub trait GeographyResolver: Send + Sync {
    fn allowed_countries(
        &self,
        geography: &PolicyGeography,
        hierarchy: &GeographyHierarchy,
    ) -> BTreeSet<CountryId>;
}

#[derive(Default)]
pub struct DeterministicGeographyResolver;

impl GeographyResolver for DeterministicGeographyResolver {
    fn allowed_countries(
        &self,
        geography: &PolicyGeography,
        hierarchy: &GeographyHierarchy,
    ) -> BTreeSet<CountryId> {
        resolve_allowed_countries(geography, hierarchy)
    }
}

/// Expands a policy's geography rules into the concrete set of permitted
/// countries.
///
/// Countries allowed directly, via an allowed continent, or via an allowed
/// region (region -> continents -> countries) are unioned; disabled
/// countries are subtracted strictly last so a broader match can never
/// re-admit one. The result is a set, so expansion is idempotent and
/// order-independent. An empty result is valid; whether it means "nowhere"
/// or "unrestricted" is the caller's call via
/// [`PolicyGeography::has_allow_rules`].
pub fn resolve_allowed_countries(
    geography: &PolicyGeography,
    hierarchy: &GeographyHierarchy,
) -> BTreeSet<CountryId> {
    let continent_regions: HashMap<ContinentId, RegionId> = hierarchy
        .continents
        .iter()
        .filter_map(|continent| continent.region_id.map(|region_id| (continent.id, region_id)))
        .collect();

    let mut allowed: BTreeSet<CountryId> = geography.country_ids.clone();

    for country in &hierarchy.countries {
        let Some(continent_id) = country.continent_id else {
            continue;
        };

        if geography.continent_ids.contains(&continent_id) {
            allowed.insert(country.id);
            continue;
        }

        if let Some(region_id) = continent_regions.get(&continent_id) {
            if geography.region_ids.contains(region_id) {
                allowed.insert(country.id);
            }
        }
    }

    for disabled in &geography.disabled_country_ids {
        allowed.remove(disabled);
    }

    allowed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::domain::geography::{
        Continent, ContinentId, Country, CountryId, GeographyHierarchy, PolicyGeography, Region,
        RegionId,
    };

    use super::resolve_allowed_countries;

    fn hierarchy() -> GeographyHierarchy {
        GeographyHierarchy {
            regions: vec![
                Region { id: RegionId(1), name: "Asia-Pacific".to_string() },
                Region { id: RegionId(2), name: "Europe-Africa".to_string() },
            ],
            continents: vec![
                Continent { id: ContinentId(10), name: "Oceania".to_string(), region_id: Some(RegionId(1)) },
                Continent { id: ContinentId(11), name: "Asia".to_string(), region_id: Some(RegionId(1)) },
                Continent { id: ContinentId(12), name: "Europe".to_string(), region_id: Some(RegionId(2)) },
                Continent { id: ContinentId(13), name: "Antarctica".to_string(), region_id: None },
            ],
            countries: vec![
                Country { id: CountryId(36), name: "Australia".to_string(), continent_id: Some(ContinentId(10)) },
                Country { id: CountryId(554), name: "New Zealand".to_string(), continent_id: Some(ContinentId(10)) },
                Country { id: CountryId(392), name: "Japan".to_string(), continent_id: Some(ContinentId(11)) },
                Country { id: CountryId(276), name: "Germany".to_string(), continent_id: Some(ContinentId(12)) },
                Country { id: CountryId(250), name: "France".to_string(), continent_id: Some(ContinentId(12)) },
                Country { id: CountryId(10), name: "Antarctica".to_string(), continent_id: None },
            ],
        }
    }

    fn ids(raw: &[u32]) -> BTreeSet<CountryId> {
        raw.iter().copied().map(CountryId).collect()
    }

    #[test]
    fn direct_country_ids_pass_through() {
        let geography = PolicyGeography {
            country_ids: ids(&[392]),
            ..PolicyGeography::default()
        };

        assert_eq!(resolve_allowed_countries(&geography, &hierarchy()), ids(&[392]));
    }

    #[test]
    fn continent_match_expands_to_member_countries() {
        let geography = PolicyGeography {
            continent_ids: [ContinentId(10)].into_iter().collect(),
            ..PolicyGeography::default()
        };

        assert_eq!(resolve_allowed_countries(&geography, &hierarchy()), ids(&[36, 554]));
    }

    #[test]
    fn region_match_expands_two_hops() {
        let geography = PolicyGeography {
            region_ids: [RegionId(1)].into_iter().collect(),
            ..PolicyGeography::default()
        };

        assert_eq!(resolve_allowed_countries(&geography, &hierarchy()), ids(&[36, 392, 554]));
    }

    #[test]
    fn country_reached_via_two_paths_appears_once() {
        let geography = PolicyGeography {
            country_ids: ids(&[36]),
            continent_ids: [ContinentId(10)].into_iter().collect(),
            ..PolicyGeography::default()
        };

        let allowed = resolve_allowed_countries(&geography, &hierarchy());
        assert_eq!(allowed, ids(&[36, 554]));
    }

    #[test]
    fn resolution_is_idempotent() {
        let geography = PolicyGeography {
            region_ids: [RegionId(2)].into_iter().collect(),
            country_ids: ids(&[36]),
            disabled_country_ids: ids(&[250]),
            ..PolicyGeography::default()
        };
        let reference = hierarchy();

        let first = resolve_allowed_countries(&geography, &reference);
        let second = resolve_allowed_countries(&geography, &reference);
        assert_eq!(first, second);
    }

    #[test]
    fn disabled_country_wins_over_continent_expansion() {
        let geography = PolicyGeography {
            continent_ids: [ContinentId(10)].into_iter().collect(),
            disabled_country_ids: ids(&[554]),
            ..PolicyGeography::default()
        };

        assert_eq!(resolve_allowed_countries(&geography, &hierarchy()), ids(&[36]));
    }

    #[test]
    fn disabled_country_wins_over_direct_and_region_match() {
        let geography = PolicyGeography {
            region_ids: [RegionId(1)].into_iter().collect(),
            country_ids: ids(&[36]),
            disabled_country_ids: ids(&[36]),
            ..PolicyGeography::default()
        };

        assert_eq!(resolve_allowed_countries(&geography, &hierarchy()), ids(&[392, 554]));
    }

    #[test]
    fn no_rules_resolve_to_empty_set() {
        let geography = PolicyGeography::default();
        assert!(resolve_allowed_countries(&geography, &hierarchy()).is_empty());
    }

    #[test]
    fn countries_without_continent_only_match_directly() {
        let geography = PolicyGeography {
            region_ids: [RegionId(1), RegionId(2)].into_iter().collect(),
            continent_ids: [ContinentId(13)].into_iter().collect(),
            ..PolicyGeography::default()
        };

        let allowed = resolve_allowed_countries(&geography, &hierarchy());
        assert!(!allowed.contains(&CountryId(10)));

        let direct = PolicyGeography { country_ids: ids(&[10]), ..PolicyGeography::default() };
        assert_eq!(resolve_allowed_countries(&direct, &hierarchy()), ids(&[10]));
    }
}
