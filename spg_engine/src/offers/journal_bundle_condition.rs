use std::collections::BTreeSet;

use journal_tools::JournalBundle;
use log::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BenefitApplication, DigitalBookBenefit};
use crate::{
    db_types::{BasketLine, BasketSnapshot},
    traits::BundleCatalog,
};

/// An offer condition that is met when a basket holds a product for every course and every journal in a journal
/// bundle.
///
/// The bundle lives in an external catalog and is fetched (through the catalog's cache) every time the condition is
/// evaluated. If the catalog cannot be reached, the condition is simply not met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalBundleCondition {
    pub journal_bundle_uuid: String,
}

/// A basket line the condition applies to, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicableLine {
    pub line_id: i64,
    pub sku: Option<String>,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEligibility {
    pub satisfied: bool,
    pub applicable_lines: Vec<ApplicableLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<BundleDiscount>,
}

/// The discount a benefit gives on the lines of a basket that satisfies the condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDiscount {
    pub name: String,
    pub total: Decimal,
    #[serde(flatten)]
    pub application: BenefitApplication,
}

impl JournalBundleCondition {
    pub fn new(journal_bundle_uuid: &str) -> Self {
        Self { journal_bundle_uuid: journal_bundle_uuid.to_string() }
    }

    pub fn name(&self) -> String {
        format!("Basket contains every product in bundle {}", self.journal_bundle_uuid)
    }

    async fn fetch_bundle<C: BundleCatalog>(&self, catalog: &C) -> Option<JournalBundle> {
        match catalog.fetch_journal_bundle(&self.journal_bundle_uuid).await {
            Ok(bundle) if bundle.is_empty() => {
                debug!("📚️ Journal bundle {} is empty", self.journal_bundle_uuid);
                None
            },
            Ok(bundle) => Some(bundle),
            Err(e) => {
                warn!("📚️ Could not fetch journal bundle {}. {e}", self.journal_bundle_uuid);
                None
            },
        }
    }

    /// True if the basket contains a SKU for every course and every journal in the bundle.
    pub async fn is_satisfied<C: BundleCatalog>(&self, catalog: &C, basket: &BasketSnapshot) -> bool {
        let basket_skus = basket.skus();
        let Some(bundle) = self.fetch_bundle(catalog).await else {
            return false;
        };
        if basket_contains_all_required_courses(&basket_skus, &bundle).is_none() {
            trace!("📚️ Basket #{} is missing a course from bundle {}", basket.id(), self.journal_bundle_uuid);
            return false;
        }
        basket_contains_all_journals(&basket_skus, &bundle)
    }

    /// The SKUs this condition applies to: every eligible course seat and every journal. Empty if the bundle cannot be
    /// fetched.
    pub async fn get_applicable_skus<C: BundleCatalog>(&self, catalog: &C) -> BTreeSet<String> {
        self.fetch_bundle(catalog).await.map(|b| b.all_skus()).unwrap_or_default()
    }

    pub fn can_apply_condition(line: &BasketLine, applicable_skus: &BTreeSet<String>) -> bool {
        match &line.partner_sku {
            Some(sku) => line.is_discountable && applicable_skus.contains(sku),
            None => false,
        }
    }

    /// The `(unit price, line)` pairs the condition can consume, most expensive first unless `most_expensive_first` is
    /// false. Lines with a zero price are left out. Lines with the same price keep their basket order.
    pub async fn get_applicable_lines<C: BundleCatalog>(
        &self,
        catalog: &C,
        basket: &BasketSnapshot,
        most_expensive_first: bool,
    ) -> Vec<(Decimal, BasketLine)> {
        let skus = self.get_applicable_skus(catalog).await;
        let mut lines = basket
            .lines
            .iter()
            .filter(|line| Self::can_apply_condition(line, &skus))
            .filter(|line| !line.unit_price_incl_tax.is_zero())
            .map(|line| (line.unit_price_incl_tax, line.clone()))
            .collect::<Vec<_>>();
        if most_expensive_first {
            lines.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            lines.sort_by(|a, b| a.0.cmp(&b.0));
        }
        lines
    }

    pub async fn evaluate<C: BundleCatalog>(&self, catalog: &C, basket: &BasketSnapshot) -> BundleEligibility {
        self.evaluate_offer(catalog, basket, None).await
    }

    /// Like [`Self::evaluate`], and also works out what `benefit` is worth on the applicable lines. Baskets that do
    /// not satisfy the condition get no discount.
    pub async fn evaluate_offer<C: BundleCatalog>(
        &self,
        catalog: &C,
        basket: &BasketSnapshot,
        benefit: Option<&DigitalBookBenefit>,
    ) -> BundleEligibility {
        let satisfied = self.is_satisfied(catalog, basket).await;
        let lines = self.get_applicable_lines(catalog, basket, true).await;
        let discount = benefit.filter(|_| satisfied).map(|benefit| {
            let application = benefit.apply(&lines);
            trace!("📚️ {benefit} is worth {} on basket #{}", application.total(), basket.id());
            BundleDiscount { name: benefit.name(), total: application.total(), application }
        });
        let applicable_lines = lines
            .into_iter()
            .map(|(unit_price, line)| ApplicableLine { line_id: line.id, sku: line.partner_sku, unit_price })
            .collect();
        BundleEligibility { satisfied, applicable_lines, discount }
    }
}

/// Checks that every course in the bundle is represented in the basket.
///
/// Each course consumes the basket SKUs that can satisfy it, so one SKU never counts for two courses. Returns the
/// SKUs left over once every course has been matched, or `None` if a course is missing.
pub fn basket_contains_all_required_courses(
    basket_skus: &BTreeSet<String>,
    bundle: &JournalBundle,
) -> Option<BTreeSet<String>> {
    bundle.courses.iter().try_fold(basket_skus.clone(), |working, course| {
        if working.is_empty() {
            return None;
        }
        let course_skus = bundle.course_skus(course);
        let remaining = working.difference(&course_skus).cloned().collect::<BTreeSet<String>>();
        // Nothing removed, so nothing in the basket is a seat in this course
        if remaining.len() == working.len() {
            return None;
        }
        Some(remaining)
    })
}

/// Checks that the SKU of every journal in the bundle is in the basket.
pub fn basket_contains_all_journals(basket_skus: &BTreeSet<String>, bundle: &JournalBundle) -> bool {
    bundle.journals.iter().all(|journal| basket_skus.contains(&journal.sku))
}
