//! Rule-based template selection
//!
//! A [`TierTable`] lists template ids at three levels of specificity:
//! every case, every case of a category, and a category at one quality tier.
//! [`TemplateResolver::resolve`] concatenates the matching levels in that
//! order and keeps the first occurrence of each id. The same resolver drives
//! document generation and checklist seeding, each with its own table.

use crate::catalog::TemplateId;
use indexmap::IndexSet;
use intake_core::{CaseCategory, QualityTier};
use serde::{Deserialize, Serialize};

/// Templates for one quality tier within a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTemplates {
    pub quality: QualityTier,
    #[serde(default)]
    pub templates: Vec<TemplateId>,
}

/// Templates for one category, with optional per-quality additions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTier {
    pub category: CaseCategory,
    #[serde(default)]
    pub templates: Vec<TemplateId>,
    #[serde(default)]
    pub qualities: Vec<QualityTemplates>,
}

impl CategoryTier {
    /// Create tier applying to every quality of `category`
    #[must_use]
    pub fn new<I, S>(category: CaseCategory, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TemplateId>,
    {
        Self {
            category,
            templates: templates.into_iter().map(Into::into).collect(),
            qualities: Vec::new(),
        }
    }

    /// Add templates for a set of quality tiers
    #[must_use]
    pub fn with_qualities<I, S>(mut self, qualities: &[QualityTier], templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TemplateId>,
    {
        let templates: Vec<TemplateId> = templates.into_iter().map(Into::into).collect();
        for &quality in qualities {
            self.qualities.push(QualityTemplates {
                quality,
                templates: templates.clone(),
            });
        }
        self
    }

    fn for_quality(&self, quality: QualityTier) -> impl Iterator<Item = &TemplateId> {
        self.qualities
            .iter()
            .filter(move |q| q.quality == quality)
            .flat_map(|q| q.templates.iter())
    }
}

/// Three-level template table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    /// Applies to every case
    #[serde(default)]
    pub default: Vec<TemplateId>,
    #[serde(default)]
    pub categories: Vec<CategoryTier>,
}

impl TierTable {
    /// Create table with only the default tier
    #[must_use]
    pub fn new<I, S>(default: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TemplateId>,
    {
        Self {
            default: default.into_iter().map(Into::into).collect(),
            categories: Vec::new(),
        }
    }

    /// Add a category tier
    #[must_use]
    pub fn with_category(mut self, tier: CategoryTier) -> Self {
        self.categories.push(tier);
        self
    }

    /// Built-in document templates generated at intake
    #[must_use]
    pub fn documents() -> Self {
        let strong = [QualityTier::Excellent, QualityTier::Good];
        Self::new(["representation-letter"])
            .with_category(
                CategoryTier::new(
                    CaseCategory::MotorVehicle,
                    ["insurance-notice-letter", "demand-letter"],
                )
                .with_qualities(&strong, ["demand-letter-high-estimate"]),
            )
            .with_category(
                CategoryTier::new(
                    CaseCategory::Fall,
                    ["evidence-preservation-letter", "demand-letter"],
                )
                .with_qualities(&strong, ["demand-letter-high-estimate"]),
            )
            .with_category(CategoryTier::new(
                CaseCategory::ProductLiability,
                ["evidence-preservation-letter", "demand-letter"],
            ))
    }

    /// Built-in onboarding checklists seeded at intake
    #[must_use]
    pub fn checklists() -> Self {
        let strong = [QualityTier::Excellent, QualityTier::Good];
        let general = |category| {
            CategoryTier::new(category, Vec::<TemplateId>::new())
                .with_qualities(&strong, ["tasks-initial-good-verbal"])
        };
        Self::new(["tasks-generic"])
            .with_category(
                CategoryTier::new(CaseCategory::MotorVehicle, Vec::<TemplateId>::new())
                    .with_qualities(&strong, ["tasks-initial-mva-good-verbal"])
                    .with_qualities(&[QualityTier::Poor], ["tasks-initial-mva-bad-verbal"])
                    .with_qualities(&[QualityTier::Zero], ["tasks-initial-mva-zero"]),
            )
            .with_category(general(CaseCategory::Fall))
            .with_category(general(CaseCategory::ProductLiability))
            .with_category(general(CaseCategory::Other))
    }

    fn category(&self, category: CaseCategory) -> impl Iterator<Item = &CategoryTier> {
        self.categories.iter().filter(move |c| c.category == category)
    }
}

/// Resolves template ids for a case
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    table: TierTable,
}

impl TemplateResolver {
    /// Create resolver over a tier table
    #[inline]
    #[must_use]
    pub fn new(table: TierTable) -> Self {
        Self { table }
    }

    /// Underlying table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// Ordered, duplicate-free template ids for a case
    ///
    /// Unknown category or quality simply contributes nothing.
    #[must_use]
    pub fn resolve(
        &self,
        category: Option<CaseCategory>,
        quality: Option<QualityTier>,
    ) -> Vec<TemplateId> {
        let mut ids: IndexSet<&TemplateId> = self.table.default.iter().collect();

        if let Some(category) = category {
            for tier in self.table.category(category) {
                ids.extend(tier.templates.iter());
            }
            if let Some(quality) = quality {
                for tier in self.table.category(category) {
                    ids.extend(tier.for_quality(quality));
                }
            }
        }

        ids.into_iter().cloned().collect()
    }
}
