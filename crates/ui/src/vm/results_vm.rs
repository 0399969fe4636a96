use services::{Comparison, CompletedAssessment};
use wheel_core::model::{AssessmentId, AssessmentRecord, AssessmentResults};
use wheel_core::scoring::{overall_score, percentage};

use crate::vm::time_fmt::{format_datetime, format_delta, format_score};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubcategoryRowVm {
    pub name: String,
    pub score: String,
    pub percentage: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaRowVm {
    pub name: String,
    pub color: String,
    pub score: String,
    pub percentage: u8,
    pub subcategories: Vec<SubcategoryRowVm>,
}

/// Results page content.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsVm {
    pub assessment_id: AssessmentId,
    pub completed_at_str: String,
    pub overall_percentage: u8,
    pub areas: Vec<AreaRowVm>,
    pub results: AssessmentResults,
}

impl From<&CompletedAssessment> for ResultsVm {
    fn from(done: &CompletedAssessment) -> Self {
        let results = &done.results;
        let areas = results
            .area_results
            .iter()
            .map(|area| AreaRowVm {
                name: area.name.clone(),
                color: area.color.clone(),
                score: format_score(area.average_score),
                percentage: area.percentage,
                subcategories: results
                    .subcategories_of(area.id)
                    .map(|sub| SubcategoryRowVm {
                        name: sub.name.clone(),
                        score: format_score(sub.average_score),
                        percentage: sub.percentage,
                    })
                    .collect(),
            })
            .collect();

        Self {
            assessment_id: done.record.id(),
            completed_at_str: done
                .record
                .completed_at()
                .map(format_datetime)
                .unwrap_or_default(),
            overall_percentage: percentage(overall_score(
                results.area_results.iter().map(|a| a.average_score),
            )),
            areas,
            results: results.clone(),
        }
    }
}

#[must_use]
pub fn map_results(done: &CompletedAssessment) -> ResultsVm {
    ResultsVm::from(done)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItemVm {
    pub id: AssessmentId,
    pub completed_at_str: String,
}

#[must_use]
pub fn map_history_items(records: &[AssessmentRecord]) -> Vec<HistoryItemVm> {
    records
        .iter()
        .map(|record| HistoryItemVm {
            id: record.id(),
            completed_at_str: record
                .completed_at()
                .map(format_datetime)
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaRowVm {
    pub name: String,
    pub color: String,
    pub older: String,
    pub newer: String,
    pub delta: String,
    pub improved: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonVm {
    pub newer_date: String,
    pub older_date: String,
    pub rows: Vec<DeltaRowVm>,
}

#[must_use]
pub fn map_comparison(comparison: &Comparison) -> ComparisonVm {
    let date = |record: &AssessmentRecord| {
        record
            .completed_at()
            .map(format_datetime)
            .unwrap_or_default()
    };
    ComparisonVm {
        newer_date: date(&comparison.newer.record),
        older_date: date(&comparison.older.record),
        rows: comparison
            .deltas
            .iter()
            .map(|d| DeltaRowVm {
                name: d.name.clone(),
                color: d.color.clone(),
                older: format_score(d.older_score),
                newer: format_score(d.newer_score),
                delta: format_delta(d.score_delta),
                improved: d.improved(),
            })
            .collect(),
    }
}
