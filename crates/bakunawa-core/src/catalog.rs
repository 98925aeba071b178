//! Effect catalog: the Moon and Celestial Phenomenon pools and selection.
//!
//! Pools come from a [`CatalogLoader`]. Any pool still empty after loading
//! is filled from the built-in defaults below, so a match is always
//! playable. Selection is uniform among eligible entries:
//!
//! - Moon effects: the Neutral pool after a drawn round, otherwise the
//!   Normal pool. The winner and the loser share the Normal pool.
//! - Phenomena: entries whose threshold equals the signed favor or its
//!   absolute value.

use std::path::{Path, PathBuf};

use bakunawa_types::{EffectCategory, EffectType, MoonEffect, MoonType, PhenomenonEffect};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::random::RandomSource;

/// Errors raised while loading an external catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file.
    #[error("failed to read catalog file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the catalog YAML.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A catalog entry cannot be used.
    #[error("invalid catalog entry '{name}': {reason}")]
    InvalidEntry {
        /// Name of the offending entry.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for CatalogError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Source of effect pools, consulted once when the engine is built.
pub trait CatalogLoader {
    /// Moon effects as `(normal_pool, neutral_pool)`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backing store cannot be read.
    fn load_moon_effects(&self) -> Result<(Vec<MoonEffect>, Vec<MoonEffect>), CatalogError>;

    /// The phenomenon pool.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backing store cannot be read.
    fn load_phenomenon_effects(&self) -> Result<Vec<PhenomenonEffect>, CatalogError>;
}

/// A loader with no entries of its own; every pool falls back to defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogLoader for BuiltinCatalog {
    fn load_moon_effects(&self) -> Result<(Vec<MoonEffect>, Vec<MoonEffect>), CatalogError> {
        Ok((Vec::new(), Vec::new()))
    }

    fn load_phenomenon_effects(&self) -> Result<Vec<PhenomenonEffect>, CatalogError> {
        Ok(Vec::new())
    }
}

/// On-disk catalog layout.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    moon_effects: Vec<MoonEffect>,
    #[serde(default)]
    phenomena: Vec<PhenomenonEffect>,
}

/// Loads effects from a YAML file with `moon_effects` and `phenomena` lists.
///
/// Moon effects are split into pools by their `moon_type`.
///
/// ```yaml
/// moon_effects:
///   - name: Blood Tide
///     moon_type: Normal
///     effect_type: Debuff
///     energy_change: -2
/// phenomena:
///   - name: Starfall
///     trigger_threshold: 4
///     effect_category: Global
/// ```
#[derive(Debug, Clone)]
pub struct YamlCatalog {
    path: PathBuf,
}

impl YamlCatalog {
    /// A loader reading `path` on each load call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CatalogFile, CatalogError> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse_catalog(&contents)
    }
}

fn parse_catalog(yaml: &str) -> Result<CatalogFile, CatalogError> {
    if yaml.trim().is_empty() {
        return Ok(CatalogFile::default());
    }
    Ok(serde_yml::from_str(yaml)?)
}

impl CatalogLoader for YamlCatalog {
    fn load_moon_effects(&self) -> Result<(Vec<MoonEffect>, Vec<MoonEffect>), CatalogError> {
        let file = self.read()?;
        Ok(file
            .moon_effects
            .into_iter()
            .partition(|e| e.moon_type == MoonType::Normal))
    }

    fn load_phenomenon_effects(&self) -> Result<Vec<PhenomenonEffect>, CatalogError> {
        Ok(self.read()?.phenomena)
    }
}

/// The three effect pools and their selection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectCatalog {
    normal: Vec<MoonEffect>,
    neutral: Vec<MoonEffect>,
    phenomena: Vec<PhenomenonEffect>,
}

impl EffectCatalog {
    /// A catalog with exactly these pools. Empty pools stay empty.
    pub const fn new(
        normal: Vec<MoonEffect>,
        neutral: Vec<MoonEffect>,
        phenomena: Vec<PhenomenonEffect>,
    ) -> Self {
        Self {
            normal,
            neutral,
            phenomena,
        }
    }

    /// The built-in defaults for every pool.
    pub fn builtin() -> Self {
        Self::new(
            default_normal_effects(),
            default_neutral_effects(),
            default_phenomena(),
        )
    }

    /// Load from `loader`, fill empty pools with defaults, and validate.
    ///
    /// # Errors
    ///
    /// Propagates loader failures, and returns
    /// [`CatalogError::InvalidEntry`] for a phenomenon with zero duration.
    pub fn load(loader: &dyn CatalogLoader) -> Result<Self, CatalogError> {
        let (normal, neutral) = loader.load_moon_effects()?;
        let phenomena = loader.load_phenomenon_effects()?;
        let catalog = Self::new(normal, neutral, phenomena).with_fallbacks();
        catalog.validate()?;
        debug!(
            normal = catalog.normal.len(),
            neutral = catalog.neutral.len(),
            phenomena = catalog.phenomena.len(),
            "Effect catalog loaded"
        );
        Ok(catalog)
    }

    /// Replace each empty pool with its built-in defaults.
    #[must_use]
    pub fn with_fallbacks(mut self) -> Self {
        if self.normal.is_empty() {
            debug!("Normal moon pool empty, using defaults");
            self.normal = default_normal_effects();
        }
        if self.neutral.is_empty() {
            debug!("Neutral moon pool empty, using defaults");
            self.neutral = default_neutral_effects();
        }
        if self.phenomena.is_empty() {
            debug!("Phenomenon pool empty, using defaults");
            self.phenomena = default_phenomena();
        }
        self
    }

    /// Check every entry is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEntry`] for a phenomenon with zero
    /// duration, which would never expire once active.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(bad) = self.phenomena.iter().find(|p| p.duration == 0) {
            return Err(CatalogError::InvalidEntry {
                name: bad.name.clone(),
                reason: String::from("phenomenon duration must be at least 1 round"),
            });
        }
        Ok(())
    }

    /// The Normal moon pool.
    pub fn normal_effects(&self) -> &[MoonEffect] {
        &self.normal
    }

    /// The Neutral moon pool.
    pub fn neutral_effects(&self) -> &[MoonEffect] {
        &self.neutral
    }

    /// The phenomenon pool.
    pub fn phenomena(&self) -> &[PhenomenonEffect] {
        &self.phenomena
    }

    /// Pick a Moon effect for the given last-round outcome (`0` = drawn).
    pub fn select_moon(
        &self,
        last_round_winner: i8,
        rng: &mut dyn RandomSource,
    ) -> Option<&MoonEffect> {
        let pool = if last_round_winner == 0 {
            &self.neutral
        } else {
            &self.normal
        };
        let picked = rng.pick_index(pool.len()).and_then(|i| pool.get(i));
        if picked.is_none() {
            warn!(last_round_winner, "No moon effect available");
        }
        picked
    }

    /// Pick a phenomenon eligible at `favor`.
    pub fn select_phenomenon(
        &self,
        favor: i32,
        rng: &mut dyn RandomSource,
    ) -> Option<&PhenomenonEffect> {
        let eligible: Vec<&PhenomenonEffect> = self
            .phenomena
            .iter()
            .filter(|p| p.is_eligible(favor))
            .collect();
        let picked = rng
            .pick_index(eligible.len())
            .and_then(|i| eligible.get(i).copied());
        if picked.is_none() {
            debug!(favor, "No phenomenon eligible");
        }
        picked
    }

    /// Look up a phenomenon by name.
    pub fn find_phenomenon(&self, name: &str) -> Option<&PhenomenonEffect> {
        self.phenomena.iter().find(|p| p.name == name)
    }
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Built-in defaults
// ---------------------------------------------------------------------------

fn moon(
    name: &str,
    description: &str,
    moon_type: MoonType,
    effect_type: EffectType,
    energy_change: i32,
    attack_modifier: i32,
) -> MoonEffect {
    MoonEffect {
        name: name.to_owned(),
        description: description.to_owned(),
        moon_type,
        effect_type,
        duration: 1,
        energy_change,
        attack_modifier,
        defense_modifier: 0,
        favor_modifier: 0,
        special_condition: None,
    }
}

fn phenomenon(
    name: &str,
    description: &str,
    trigger_threshold: i32,
    effect_category: EffectCategory,
) -> PhenomenonEffect {
    PhenomenonEffect {
        name: name.to_owned(),
        description: description.to_owned(),
        duration: 2,
        trigger_threshold,
        effect_category,
        is_active: false,
    }
}

/// Built-in Normal moon pool.
pub fn default_normal_effects() -> Vec<MoonEffect> {
    vec![
        moon(
            "Lunar Blessing",
            "+2 Attack to the next card you play.",
            MoonType::Normal,
            EffectType::Buff,
            0,
            2,
        ),
        moon(
            "Tidal Drain",
            "Lose 1 Energy this round.",
            MoonType::Normal,
            EffectType::Debuff,
            -1,
            0,
        ),
        moon(
            "Ancestral Surge",
            "Gain +1 Energy this round.",
            MoonType::Normal,
            EffectType::Buff,
            1,
            0,
        ),
        moon(
            "Blank Fate",
            "Nothing happens.",
            MoonType::Normal,
            EffectType::Neutral,
            0,
            0,
        ),
    ]
}

/// Built-in Neutral moon pool.
pub fn default_neutral_effects() -> Vec<MoonEffect> {
    vec![
        moon(
            "Equal Drain",
            "Both teams lose 1 Energy.",
            MoonType::Neutral,
            EffectType::Global,
            -1,
            0,
        ),
        moon(
            "Equal Surge",
            "Both teams gain +1 Energy.",
            MoonType::Neutral,
            EffectType::Global,
            1,
            0,
        ),
        moon(
            "Blank Fate",
            "Nothing happens.",
            MoonType::Neutral,
            EffectType::Neutral,
            0,
            0,
        ),
    ]
}

/// Built-in phenomenon pool.
pub fn default_phenomena() -> Vec<PhenomenonEffect> {
    vec![
        phenomenon(
            "Crimson Eclipse",
            "All Attack cards lose 2 Attack this round and next.",
            2,
            EffectCategory::Attack,
        ),
        phenomenon(
            "Torrential Moonfall",
            "Defense cards cost +1 Energy.",
            2,
            EffectCategory::Defense,
        ),
        phenomenon(
            "Shadow Veil",
            "Support card effects are halved.",
            4,
            EffectCategory::Support,
        ),
        phenomenon(
            "Radiant Blessing",
            "Both teams recover 1 random cooldown card.",
            4,
            EffectCategory::Global,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::random::SequenceSource;

    struct FixedLoader {
        normal: Vec<MoonEffect>,
        phenomena: Vec<PhenomenonEffect>,
    }

    impl CatalogLoader for FixedLoader {
        fn load_moon_effects(&self) -> Result<(Vec<MoonEffect>, Vec<MoonEffect>), CatalogError> {
            Ok((self.normal.clone(), Vec::new()))
        }

        fn load_phenomenon_effects(&self) -> Result<Vec<PhenomenonEffect>, CatalogError> {
            Ok(self.phenomena.clone())
        }
    }

    #[test]
    fn builtin_loader_gets_every_default() {
        let catalog = EffectCatalog::load(&BuiltinCatalog).unwrap();
        assert_eq!(catalog.normal_effects().len(), 4);
        assert_eq!(catalog.neutral_effects().len(), 3);
        assert_eq!(catalog.phenomena().len(), 4);
        assert_eq!(catalog, EffectCatalog::builtin());
    }

    #[test]
    fn fallback_is_per_pool() {
        let custom = moon("Blood Tide", "", MoonType::Normal, EffectType::Debuff, -2, 0);
        let loader = FixedLoader {
            normal: vec![custom.clone()],
            phenomena: Vec::new(),
        };
        let catalog = EffectCatalog::load(&loader).unwrap();
        assert_eq!(catalog.normal_effects(), &[custom]);
        assert_eq!(catalog.neutral_effects().len(), 3);
        assert_eq!(catalog.phenomena().len(), 4);
    }

    #[test]
    fn zero_duration_phenomenon_is_rejected() {
        let mut bad = phenomenon("Stillness", "", 2, EffectCategory::Global);
        bad.duration = 0;
        let loader = FixedLoader {
            normal: Vec::new(),
            phenomena: vec![bad],
        };
        let err = EffectCatalog::load(&loader).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { ref name, .. } if name == "Stillness"));
    }

    #[test]
    fn drawn_round_selects_neutral_pool() {
        let catalog = EffectCatalog::builtin();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            let effect = catalog.select_moon(0, &mut rng).unwrap();
            assert_eq!(effect.moon_type, MoonType::Neutral);
        }
        for winner in [1, -1] {
            let effect = catalog.select_moon(winner, &mut rng).unwrap();
            assert_eq!(effect.moon_type, MoonType::Normal);
        }
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let catalog = EffectCatalog::new(Vec::new(), Vec::new(), Vec::new());
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(catalog.select_moon(1, &mut rng).is_none());
        assert!(catalog.select_phenomenon(2, &mut rng).is_none());
    }

    #[test]
    fn phenomenon_eligibility_uses_signed_and_absolute_favor() {
        let catalog = EffectCatalog::builtin();
        let mut rng = SequenceSource::new([0, 1]);
        let first = catalog.select_phenomenon(-4, &mut rng).unwrap();
        let second = catalog.select_phenomenon(-4, &mut rng).unwrap();
        assert_eq!(first.name, "Shadow Veil");
        assert_eq!(second.name, "Radiant Blessing");
        assert!(catalog.select_phenomenon(3, &mut rng).is_none());
    }

    #[test]
    fn single_eligible_phenomenon_is_always_selected() {
        let only = phenomenon("Starfall", "", 2, EffectCategory::Global);
        let catalog = EffectCatalog::new(Vec::new(), Vec::new(), vec![only]);
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(catalog.select_phenomenon(2, &mut rng).unwrap().name, "Starfall");
        }
    }

    #[test]
    fn yaml_catalog_splits_moon_pools() {
        let yaml = r"
moon_effects:
  - name: Blood Tide
    moon_type: Normal
    effect_type: Debuff
    energy_change: -2
  - name: Even Keel
    moon_type: Neutral
    effect_type: Neutral
phenomena:
  - name: Starfall
    trigger_threshold: 4
    effect_category: Global
";
        let dir = std::env::temp_dir().join(format!("bakunawa-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.yaml");
        std::fs::write(&path, yaml).unwrap();

        let loader = YamlCatalog::new(&path);
        let (normal, neutral) = loader.load_moon_effects().unwrap();
        assert_eq!(normal.len(), 1);
        assert_eq!(normal.first().unwrap().name, "Blood Tide");
        assert_eq!(neutral.first().unwrap().name, "Even Keel");

        let phenomena = loader.load_phenomenon_effects().unwrap();
        assert_eq!(phenomena.first().unwrap().duration, 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_yaml_catalog_is_io_error() {
        let loader = YamlCatalog::new("/nonexistent/bakunawa/catalog.yaml");
        assert!(matches!(
            loader.load_moon_effects(),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn empty_yaml_is_an_empty_catalog() {
        let file = parse_catalog("").unwrap();
        assert!(file.moon_effects.is_empty());
        assert!(file.phenomena.is_empty());
    }
}
