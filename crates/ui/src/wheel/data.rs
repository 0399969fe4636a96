use wheel_core::ScoreSheet;
use wheel_core::model::AssessmentResults;

use super::geometry::Segment;

/// Which level of the hierarchy the wheel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Areas,
    Subcategories,
}

impl Granularity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Areas => "Areas",
            Self::Subcategories => "Subcategories",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Areas => Self::Subcategories,
            Self::Subcategories => Self::Areas,
        }
    }
}

/// Segments for finalized results. Subcategory wedges take their area's
/// color and name the area as parent.
#[must_use]
pub fn segments(results: &AssessmentResults, granularity: Granularity) -> Vec<Segment> {
    match granularity {
        Granularity::Areas => results
            .area_results
            .iter()
            .map(|area| Segment::new(area.name.clone(), area.average_score, area.color.clone()))
            .collect(),
        Granularity::Subcategories => results
            .area_results
            .iter()
            .flat_map(move |area| {
                results.subcategories_of(area.id).map(move |sub| {
                    Segment::new(sub.name.clone(), sub.average_score, area.color.clone())
                        .with_parent(area.name.clone())
                })
            })
            .collect(),
    }
}

/// Segments for the live wheel shown while answering.
#[must_use]
pub fn live_segments(sheet: &ScoreSheet, granularity: Granularity) -> Vec<Segment> {
    match granularity {
        Granularity::Areas => sheet
            .areas
            .iter()
            .map(|area| Segment::new(area.name.clone(), area.score, area.color.clone()))
            .collect(),
        Granularity::Subcategories => sheet
            .areas
            .iter()
            .flat_map(|area| {
                area.subcategories.iter().map(move |sub| {
                    Segment::new(sub.name.clone(), sub.score, area.color.clone())
                        .with_parent(area.name.clone())
                })
            })
            .collect(),
    }
}
