//! Journal bundle offers: the [`JournalBundleCondition`] decides whether a basket qualifies, and the
//! [`DigitalBookBenefit`]s work out the discount on the lines it selects.
mod benefits;
mod journal_bundle_condition;

pub use benefits::{BenefitApplication, BenefitError, BenefitType, DigitalBookBenefit, LineDiscount};
pub use journal_bundle_condition::{
    basket_contains_all_journals,
    basket_contains_all_required_courses,
    ApplicableLine,
    BundleDiscount,
    BundleEligibility,
    JournalBundleCondition,
};
