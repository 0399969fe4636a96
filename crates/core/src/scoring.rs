//! Aggregation of raw 0-10 responses into subcategory and area scores.
//!
//! One rule is used everywhere: a subcategory scores the mean of its answered
//! questions, an area scores the unweighted mean of its subcategories.

use serde::{Deserialize, Serialize};

use crate::model::{
    AssessmentResults, Catalog, LifeArea, LifeAreaId, Responses, ScoreResult, Subcategory,
    SubcategoryId, SubcategoryResult,
};

/// Upper bound of the rating scale.
pub const MAX_SCORE: f64 = 10.0;

//
// ─── SCORES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryScore {
    pub id: SubcategoryId,
    pub name: String,
    /// Mean of answered questions in `0.0..=10.0`; `0.0` when nothing is answered.
    pub score: f64,
    pub percentage: u8,
    pub answered: usize,
    pub question_count: usize,
    /// Every question answered. A partial mean is still reported.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaScore {
    pub id: LifeAreaId,
    pub name: String,
    pub color: String,
    pub score: f64,
    pub percentage: u8,
    pub complete: bool,
    pub subcategories: Vec<SubcategoryScore>,
}

/// Live scores for every area of a catalog, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub areas: Vec<AreaScore>,
}

impl ScoreSheet {
    #[must_use]
    pub fn area(&self, id: LifeAreaId) -> Option<&AreaScore> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Clamped mean of the area scores.
    #[must_use]
    pub fn overall_score(&self) -> f64 {
        overall_score(self.areas.iter().map(|a| a.score))
    }

    #[must_use]
    pub fn overall_percentage(&self) -> u8 {
        percentage(self.overall_score())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.areas.is_empty() && self.areas.iter().all(|a| a.complete)
    }

    /// Converts to the persisted representation, rounding averages to one decimal.
    #[must_use]
    pub fn to_results(&self) -> AssessmentResults {
        let area_results = self
            .areas
            .iter()
            .map(|area| ScoreResult {
                id: area.id,
                name: area.name.clone(),
                color: area.color.clone(),
                average_score: round_to_tenth(area.score),
                percentage: area.percentage,
            })
            .collect();

        let subcategory_results = self
            .areas
            .iter()
            .flat_map(|area| {
                area.subcategories.iter().map(move |sub| SubcategoryResult {
                    life_area_id: area.id,
                    result: ScoreResult {
                        id: sub.id,
                        name: sub.name.clone(),
                        color: area.color.clone(),
                        average_score: round_to_tenth(sub.score),
                        percentage: sub.percentage,
                    },
                })
            })
            .collect();

        AssessmentResults {
            area_results,
            subcategory_results,
        }
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Clamps into `0.0..=10.0`. NaN maps to zero.
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// `round(clamp(score) * 10)`, always within `0..=100`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentage(score: f64) -> u8 {
    (clamp_score(score) * 10.0).round() as u8
}

/// Rounds to one decimal place, the precision averages are stored with.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamped arithmetic mean; an empty input scores zero.
#[must_use]
pub fn overall_score(scores: impl IntoIterator<Item = f64>) -> f64 {
    clamp_score(mean(scores.into_iter().map(clamp_score)))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[must_use]
pub fn subcategory_score(responses: &Responses, subcategory: &Subcategory) -> SubcategoryScore {
    let answered: Vec<f64> = subcategory
        .questions
        .iter()
        .filter_map(|q| responses.score(q.id))
        .map(|s| s.as_f64())
        .collect();
    let question_count = subcategory.questions.len();
    let score = clamp_score(mean(answered.iter().copied()));

    SubcategoryScore {
        id: subcategory.id,
        name: subcategory.name.clone(),
        score,
        percentage: percentage(score),
        answered: answered.len(),
        question_count,
        complete: answered.len() == question_count,
    }
}

#[must_use]
pub fn area_score(responses: &Responses, area: &LifeArea) -> AreaScore {
    let subcategories: Vec<SubcategoryScore> = area
        .subcategories
        .iter()
        .map(|sub| subcategory_score(responses, sub))
        .collect();
    let score = clamp_score(mean(subcategories.iter().map(|s| s.score)));

    AreaScore {
        id: area.id,
        name: area.name.clone(),
        color: area.color.clone(),
        score,
        percentage: percentage(score),
        complete: subcategories.iter().all(|s| s.complete),
        subcategories,
    }
}

#[must_use]
pub fn score_sheet(catalog: &Catalog, responses: &Responses) -> ScoreSheet {
    ScoreSheet {
        areas: catalog
            .areas()
            .iter()
            .map(|area| area_score(responses, area))
            .collect(),
    }
}

//
// ─── COMPARISON ────────────────────────────────────────────────────────────────
//

/// Change of one area between two finalized assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDelta {
    pub id: LifeAreaId,
    pub name: String,
    pub color: String,
    pub older_score: f64,
    pub newer_score: f64,
    /// `newer - older`, rounded to one decimal.
    pub score_delta: f64,
    pub percentage_delta: i16,
}

impl AreaDelta {
    #[must_use]
    pub fn improved(&self) -> bool {
        self.score_delta > 0.0
    }
}

/// Per-area differences for areas present in both results, in `newer` order.
#[must_use]
pub fn compare_results(newer: &AssessmentResults, older: &AssessmentResults) -> Vec<AreaDelta> {
    newer
        .area_results
        .iter()
        .filter_map(|n| {
            let o = older.area(n.id)?;
            Some(AreaDelta {
                id: n.id,
                name: n.name.clone(),
                color: n.color.clone(),
                older_score: o.average_score,
                newer_score: n.average_score,
                score_delta: round_to_tenth(n.average_score - o.average_score),
                percentage_delta: i16::from(n.percentage) - i16::from(o.percentage),
            })
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionId, Score};

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    /// 4 areas x 3 subcategories x 3 questions, ids assigned sequentially.
    fn wheel_catalog() -> Catalog {
        let mut next_sub = 0;
        let mut next_q = 0;
        let areas = (1..=4)
            .map(|a| {
                let area_id = LifeAreaId::new(a);
                let subs = (0..3)
                    .map(|_| {
                        next_sub += 1;
                        let sub_id = SubcategoryId::new(next_sub);
                        let questions = (0..3)
                            .map(|_| {
                                next_q += 1;
                                Question::new(QuestionId::new(next_q), sub_id, format!("q{next_q}"))
                            })
                            .collect();
                        Subcategory::new(sub_id, area_id, format!("s{next_sub}"), questions)
                    })
                    .collect();
                LifeArea::new(area_id, format!("area {a}"), "#000000", subs)
            })
            .collect();
        Catalog::new(areas).unwrap()
    }

    fn answer_all(catalog: &Catalog, value: u8) -> Responses {
        let mut responses = Responses::new();
        for area in catalog.areas() {
            for q in area.questions() {
                responses.set_manual(q.id, score(value));
            }
        }
        responses
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.005
    }

    #[test]
    fn percentage_clamps_and_rounds() {
        assert_eq!(percentage(8.0), 80);
        assert_eq!(percentage(6.666), 67);
        assert_eq!(percentage(12.0), 100);
        assert_eq!(percentage(-3.0), 0);
        assert_eq!(percentage(f64::NAN), 0);
    }

    #[test]
    fn unanswered_questions_are_excluded_from_the_mean() {
        let catalog = wheel_catalog();
        let sub = &catalog.areas()[0].subcategories[0];
        let mut responses = Responses::new();
        responses.set_manual(sub.questions[0].id, score(9));
        responses.set_manual(sub.questions[1].id, score(6));

        let result = subcategory_score(&responses, sub);
        assert!(approx(result.score, 7.5));
        assert_eq!(result.answered, 2);
        assert_eq!(result.question_count, 3);
        assert!(!result.complete);

        let empty = subcategory_score(&Responses::new(), sub);
        assert_eq!(empty.score, 0.0);
        assert_eq!(empty.percentage, 0);
    }

    #[test]
    fn area_is_mean_of_subcategory_means() {
        let catalog = wheel_catalog();
        let area = &catalog.areas()[0];
        let mut responses = Responses::new();
        for q in area.subcategories[0].questions.iter().chain(&area.subcategories[1].questions) {
            responses.set_manual(q.id, score(10));
        }
        for q in &area.subcategories[2].questions {
            responses.set_manual(q.id, score(0));
        }

        let result = area_score(&responses, area);
        assert!(approx(result.score, 6.67));
        assert_eq!(result.percentage, 67);
        assert!(result.complete);
    }

    #[test]
    fn uniform_answers_score_uniformly() {
        let catalog = wheel_catalog();
        let sheet = score_sheet(&catalog, &answer_all(&catalog, 8));

        for area in &sheet.areas {
            assert!(approx(area.score, 8.0));
            for sub in &area.subcategories {
                assert!(approx(sub.score, 8.0));
            }
        }
        assert_eq!(sheet.overall_percentage(), 80);
        assert!(sheet.is_complete());
    }

    #[test]
    fn lowering_one_answer_only_moves_its_ancestors() {
        let catalog = wheel_catalog();
        let mut responses = answer_all(&catalog, 8);
        let target = catalog.areas()[1].subcategories[0].questions[0].id;

        responses.set_manual(target, score(6));
        let sheet = score_sheet(&catalog, &responses);
        let touched = &sheet.areas[1];
        assert!(approx(touched.subcategories[0].score, 7.33));
        assert!(approx(touched.score, 7.78));

        responses.set_manual(target, score(0));
        let sheet = score_sheet(&catalog, &responses);
        let touched = &sheet.areas[1];
        assert!(approx(touched.subcategories[0].score, 5.33));
        assert!(approx(touched.score, 7.11));

        for (i, area) in sheet.areas.iter().enumerate() {
            if i != 1 {
                assert!(approx(area.score, 8.0));
            }
        }
    }

    #[test]
    fn results_round_to_one_decimal() {
        let catalog = wheel_catalog();
        let mut responses = answer_all(&catalog, 8);
        responses.set_manual(catalog.areas()[0].subcategories[0].questions[0].id, score(6));

        let results = score_sheet(&catalog, &responses).to_results();
        assert_eq!(results.area_results.len(), 4);
        assert_eq!(results.subcategory_results.len(), 12);
        assert_eq!(results.area_results[0].average_score, 7.8);
        assert_eq!(results.area_results[0].percentage, 78);
        assert_eq!(results.subcategory_results[0].result.average_score, 7.3);
    }

    #[test]
    fn compare_matches_areas_by_id() {
        let catalog = wheel_catalog();
        let older = score_sheet(&catalog, &answer_all(&catalog, 5)).to_results();
        let mut newer = score_sheet(&catalog, &answer_all(&catalog, 7)).to_results();
        newer.area_results.truncate(3);

        let deltas = compare_results(&newer, &older);
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0].score_delta, 2.0);
        assert_eq!(deltas[0].percentage_delta, 20);
        assert!(deltas[0].improved());
    }
}
