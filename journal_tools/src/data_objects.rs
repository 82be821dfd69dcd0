use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A snapshot of a journal bundle, as served by the catalog's `journal_bundles` endpoint.
///
/// Missing collections deserialize as empty, so an empty JSON object is an empty bundle rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JournalBundle {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub applicable_seat_types: Vec<String>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub journals: Vec<Journal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub course_runs: Vec<CourseRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseRun {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Seat {
    pub sku: String,
    #[serde(rename = "type")]
    pub seat_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Journal {
    #[serde(default)]
    pub uuid: String,
    pub sku: String,
    #[serde(default)]
    pub title: String,
}

impl JournalBundle {
    pub fn is_empty(&self) -> bool {
        self.uuid.is_empty() && self.courses.is_empty() && self.journals.is_empty()
    }

    pub fn is_applicable_seat_type(&self, seat_type: &str) -> bool {
        self.applicable_seat_types.iter().any(|t| t == seat_type)
    }

    /// SKUs of every seat, over all runs of `course`, whose type is one of the bundle's applicable seat types.
    pub fn course_skus(&self, course: &Course) -> BTreeSet<String> {
        course
            .course_runs
            .iter()
            .flat_map(|run| run.seats.iter())
            .filter(|seat| self.is_applicable_seat_type(&seat.seat_type))
            .map(|seat| seat.sku.clone())
            .collect()
    }

    pub fn journal_skus(&self) -> BTreeSet<String> {
        self.journals.iter().map(|j| j.sku.clone()).collect()
    }

    /// Every SKU that takes part in the bundle: eligible course seats and journals.
    pub fn all_skus(&self) -> BTreeSet<String> {
        let mut skus = self.courses.iter().flat_map(|c| self.course_skus(c)).collect::<BTreeSet<String>>();
        skus.extend(self.journal_skus());
        skus
    }
}
