//! Spell Catalog
//!
//! Static, read-only lookup of ability metadata, loaded once at startup.
//!
//! All lookups are case-insensitive and treat alias names exactly like the
//! canonical name. A miss returns `None`: the name simply is not an ability
//! of interest.

pub mod metadata;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CatalogError;

pub use metadata::{CastType, CollisionMask, ObstacleClass, ShapeKind, SpellMetadata};

/// Catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/spells.json");

/// Ability metadata indexed by ability name, missile name and source object.
#[derive(Debug, Default)]
pub struct SpellCatalog {
    entries: Vec<Arc<SpellMetadata>>,
    /// Lowercased spell name or alias -> entry index
    by_name: BTreeMap<String, usize>,
    /// Lowercased missile name or alias -> entry index
    by_missile: BTreeMap<String, usize>,
    /// (lowercased source object substring, entry index), catalog order
    by_source_object: Vec<(String, usize)>,
}

impl SpellCatalog {
    /// Build a catalog from records.
    ///
    /// When two records claim the same key the first one wins.
    pub fn from_records(records: Vec<SpellMetadata>) -> Self {
        let mut catalog = Self::default();

        for record in records {
            let index = catalog.entries.len();

            for name in record.all_spell_names() {
                insert_key(&mut catalog.by_name, name, index, &record.spell_name);
            }
            for name in record.all_missile_names() {
                insert_key(&mut catalog.by_missile, name, index, &record.spell_name);
            }
            if !record.source_object_name.is_empty() {
                catalog
                    .by_source_object
                    .push((record.source_object_name.to_lowercase(), index));
            }

            catalog.entries.push(Arc::new(record));
        }

        debug!("Catalog built with {} abilities", catalog.entries.len());
        catalog
    }

    /// Parse a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<SpellMetadata> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Load a JSON catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Catalog embedded in the crate (`data/spells.json`).
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Look up by ability name or alias.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<SpellMetadata>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Look up by projectile name or alias.
    pub fn lookup_by_missile_name(&self, name: &str) -> Option<&Arc<SpellMetadata>> {
        self.by_missile
            .get(&name.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Look up the first entry whose source-object name is contained in `name`.
    pub fn lookup_by_source_object_name(&self, name: &str) -> Option<&Arc<SpellMetadata>> {
        let name = name.to_lowercase();
        self.by_source_object
            .iter()
            .find(|(fragment, _)| name.contains(fragment.as_str()))
            .map(|&(_, i)| &self.entries[i])
    }

    /// Look up by owner and ability name.
    pub fn lookup(&self, champion: &str, name: &str) -> Option<&Arc<SpellMetadata>> {
        self.lookup_by_name(name)
            .filter(|spell| spell.champion_name.eq_ignore_ascii_case(champion))
    }

    /// Number of abilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the catalog holds no abilities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All abilities in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpellMetadata>> {
        self.entries.iter()
    }
}

fn insert_key(index: &mut BTreeMap<String, usize>, name: &str, entry: usize, owner: &str) {
    let key = name.to_lowercase();
    if index.contains_key(&key) {
        warn!("Duplicate catalog key {} (from {}), keeping first entry", name, owner);
        return;
    }
    index.insert(key, entry);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lux_binding() -> SpellMetadata {
        let mut spell = SpellMetadata::new("Lux", "LuxLightBinding", ShapeKind::MissileLine);
        spell.extra_spell_names = vec!["LuxLightBindingAlt".into()];
        spell.missile_name = "LuxLightBindingMis".into();
        spell.extra_missile_names = vec!["LuxLightBindingDummy".into()];
        spell
    }

    fn lux_strike() -> SpellMetadata {
        let mut spell = SpellMetadata::new("Lux", "LuxLightStrikeKugel", ShapeKind::Circle);
        spell.source_object_name = "LuxLightstrike_tar".into();
        spell
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let catalog = SpellCatalog::from_records(vec![lux_binding()]);
        assert!(catalog.lookup_by_name("luxlightbinding").is_some());
        assert!(catalog.lookup_by_name("LUXLIGHTBINDING").is_some());
        assert!(catalog.lookup_by_missile_name("luxlightbindingmis").is_some());
    }

    #[test]
    fn test_alias_returns_same_entry() {
        let catalog = SpellCatalog::from_records(vec![lux_binding(), lux_strike()]);
        let canonical = catalog.lookup_by_name("LuxLightBinding").unwrap();
        let alias = catalog.lookup_by_name("LuxLightBindingAlt").unwrap();
        assert!(Arc::ptr_eq(canonical, alias));

        let missile = catalog.lookup_by_missile_name("LuxLightBindingMis").unwrap();
        let missile_alias = catalog.lookup_by_missile_name("LuxLightBindingDummy").unwrap();
        assert!(Arc::ptr_eq(missile, missile_alias));
        assert!(Arc::ptr_eq(canonical, missile));
    }

    #[test]
    fn test_source_object_substring() {
        let catalog = SpellCatalog::from_records(vec![lux_binding(), lux_strike()]);
        let found = catalog
            .lookup_by_source_object_name("Lux_Base_E_LuxLightstrike_tar_green")
            .unwrap();
        assert_eq!(found.spell_name, "LuxLightStrikeKugel");
        assert!(catalog.lookup_by_source_object_name("SRU_Plant").is_none());
    }

    #[test]
    fn test_missing_is_none() {
        let catalog = SpellCatalog::from_records(vec![lux_binding()]);
        assert!(catalog.lookup_by_name("SummonerFlash").is_none());
        assert!(catalog.lookup_by_missile_name("").is_none());
    }

    #[test]
    fn test_duplicate_key_first_wins() {
        let mut second = lux_strike();
        second.extra_spell_names = vec!["LuxLightBinding".into()];
        let catalog = SpellCatalog::from_records(vec![lux_binding(), second]);
        assert_eq!(
            catalog.lookup_by_name("LuxLightBinding").unwrap().shape,
            ShapeKind::MissileLine
        );
    }

    #[test]
    fn test_lookup_by_owner() {
        let catalog = SpellCatalog::from_records(vec![lux_binding()]);
        assert!(catalog.lookup("lux", "LuxLightBinding").is_some());
        assert!(catalog.lookup("Morgana", "LuxLightBinding").is_none());
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = SpellCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());

        // Every alias of every builtin record resolves to its own record
        for spell in catalog.iter() {
            for name in spell.all_spell_names() {
                let found = catalog.lookup_by_name(name).unwrap();
                assert!(Arc::ptr_eq(found, spell), "alias {} resolved elsewhere", name);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_alias_lookup_matches_canonical(
            aliases in proptest::collection::btree_set("[A-Za-z]{4,12}", 1..5),
            upper in any::<bool>(),
        ) {
            let mut spell = SpellMetadata::new("Owner", "CanonicalSpellName", ShapeKind::Line);
            spell.extra_spell_names = aliases.iter().cloned().collect();
            let catalog = SpellCatalog::from_records(vec![spell]);

            let canonical = catalog.lookup_by_name("CanonicalSpellName").unwrap();
            for alias in &aliases {
                let query = if upper { alias.to_uppercase() } else { alias.clone() };
                let found = catalog.lookup_by_name(&query).unwrap();
                prop_assert!(Arc::ptr_eq(canonical, found));
            }
        }
    }
}
