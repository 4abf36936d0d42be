//! Unit families and the registry that holds them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::UnitError;

/// Name of the family used when an unknown family is allowed to fall back.
pub const PIECE_FAMILY: &str = "piece";

/// A named group of units with factors relative to one canonical unit.
///
/// Invariants: every factor is strictly positive and at least one unit
/// has factor 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UnitFamilyRecord", into = "UnitFamilyRecord")]
pub struct UnitFamily {
    name: String,
    factors: BTreeMap<String, Decimal>,
    canonical: String,
}

/// Wire form of a [`UnitFamily`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFamilyRecord {
    /// Family name (e.g. `weight`).
    pub name: String,
    /// Unit name to factor relative to the canonical unit.
    pub factors: BTreeMap<String, Decimal>,
}

impl UnitFamily {
    /// Creates a validated unit family.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFactor` for non-positive factors and
    /// `MissingCanonicalUnit` when no unit has factor 1.
    pub fn new<N, I, U>(name: N, factors: I) -> Result<Self, UnitError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (U, Decimal)>,
        U: Into<String>,
    {
        let name = name.into();
        let factors: BTreeMap<String, Decimal> =
            factors.into_iter().map(|(u, f)| (u.into(), f)).collect();

        if let Some((unit, _)) = factors.iter().find(|(_, f)| **f <= Decimal::ZERO) {
            return Err(UnitError::InvalidFactor {
                family: name,
                unit: unit.clone(),
            });
        }

        let canonical = factors
            .iter()
            .find(|(_, f)| **f == Decimal::ONE)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| UnitError::MissingCanonicalUnit(name.clone()))?;

        Ok(Self {
            name,
            factors,
            canonical,
        })
    }

    /// Family name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit with factor 1.
    #[must_use]
    pub fn canonical_unit(&self) -> &str {
        &self.canonical
    }

    /// Factor of `unit`, if it belongs to this family.
    #[must_use]
    pub fn factor(&self, unit: &str) -> Option<Decimal> {
        self.factors.get(unit).copied()
    }

    /// Returns true if `unit` belongs to this family.
    #[must_use]
    pub fn contains(&self, unit: &str) -> bool {
        self.factors.contains_key(unit)
    }

    /// Factor of `unit`, or `UnknownUnit`.
    pub fn require_factor(&self, unit: &str) -> Result<Decimal, UnitError> {
        self.factor(unit).ok_or_else(|| UnitError::UnknownUnit {
            family: self.name.clone(),
            unit: unit.to_string(),
        })
    }

    /// Units ordered largest factor first; equal factors order by name.
    #[must_use]
    pub fn units_descending(&self) -> Vec<&str> {
        let mut units: Vec<(&str, Decimal)> =
            self.factors.iter().map(|(u, f)| (u.as_str(), *f)).collect();
        units.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        units.into_iter().map(|(u, _)| u).collect()
    }
}

impl TryFrom<UnitFamilyRecord> for UnitFamily {
    type Error = UnitError;

    fn try_from(record: UnitFamilyRecord) -> Result<Self, Self::Error> {
        Self::new(record.name, record.factors)
    }
}

impl From<UnitFamily> for UnitFamilyRecord {
    fn from(family: UnitFamily) -> Self {
        Self {
            name: family.name,
            factors: family.factors,
        }
    }
}

/// Registered unit families keyed by name.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    families: BTreeMap<String, UnitFamily>,
}

impl UnitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the weight, volume, piece and length families.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for family in standard_families() {
            registry.register(family);
        }
        registry
    }

    /// Adds a family, replacing any family with the same name.
    pub fn register(&mut self, family: UnitFamily) {
        self.families.insert(family.name.clone(), family);
    }

    /// Looks up a family by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UnitFamily> {
        self.families.get(name)
    }

    /// Names of all registered families.
    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }
}

fn standard_families() -> Vec<UnitFamily> {
    let definitions: [(&str, Vec<(&str, Decimal)>); 4] = [
        (
            "weight",
            vec![
                ("ton", Decimal::new(1000, 0)),
                ("kg", Decimal::ONE),
                ("gram", Decimal::new(1, 3)),
                ("mg", Decimal::new(1, 6)),
            ],
        ),
        (
            "volume",
            vec![
                ("kiloliter", Decimal::new(1000, 0)),
                ("liter", Decimal::ONE),
                ("ml", Decimal::new(1, 3)),
            ],
        ),
        (
            PIECE_FAMILY,
            vec![
                ("gross", Decimal::new(144, 0)),
                ("dozen", Decimal::new(12, 0)),
                ("piece", Decimal::ONE),
            ],
        ),
        (
            "length",
            vec![
                ("km", Decimal::new(1000, 0)),
                ("meter", Decimal::ONE),
                ("cm", Decimal::new(1, 2)),
                ("mm", Decimal::new(1, 3)),
            ],
        ),
    ];

    definitions
        .into_iter()
        .filter_map(|(name, factors)| UnitFamily::new(name, factors).ok())
        .collect()
}
