use serde::{Deserialize, Serialize};

use crate::model::ids::{LifeAreaId, SubcategoryId};

/// Finalized score for one area or subcategory, as returned by the
/// finalize call and shown on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult<Id> {
    pub id: Id,
    pub name: String,
    pub color: String,
    /// Mean score in `0.0..=10.0`, rounded to one decimal.
    pub average_score: f64,
    /// `0..=100`.
    pub percentage: u8,
}

/// Subcategory result with the owning area, needed to group segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryResult {
    pub life_area_id: LifeAreaId,
    #[serde(flatten)]
    pub result: ScoreResult<SubcategoryId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResults {
    pub area_results: Vec<ScoreResult<LifeAreaId>>,
    pub subcategory_results: Vec<SubcategoryResult>,
}

impl AssessmentResults {
    #[must_use]
    pub fn area(&self, id: LifeAreaId) -> Option<&ScoreResult<LifeAreaId>> {
        self.area_results.iter().find(|r| r.id == id)
    }

    /// Subcategory results belonging to `area`, in stored order.
    pub fn subcategories_of(
        &self,
        area: LifeAreaId,
    ) -> impl Iterator<Item = &ScoreResult<SubcategoryId>> + '_ {
        self.subcategory_results
            .iter()
            .filter(move |s| s.life_area_id == area)
            .map(|s| &s.result)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.area_results.is_empty()
    }
}
