use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::model::ids::{LifeAreaId, QuestionId, SubcategoryId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has no life areas")]
    Empty,

    #[error("life area {0} has no subcategories")]
    EmptyArea(LifeAreaId),

    #[error("subcategory {0} has no questions")]
    EmptySubcategory(SubcategoryId),

    #[error("life area name cannot be empty")]
    EmptyAreaName,

    #[error("duplicate life area id {0}")]
    DuplicateArea(LifeAreaId),

    #[error("duplicate subcategory id {0}")]
    DuplicateSubcategory(SubcategoryId),

    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),

    #[error("subcategory {subcategory} claims parent {claimed}, but is listed under {actual}")]
    SubcategoryParentMismatch {
        subcategory: SubcategoryId,
        claimed: LifeAreaId,
        actual: LifeAreaId,
    },

    #[error("question {question} claims parent {claimed}, but is listed under {actual}")]
    QuestionParentMismatch {
        question: QuestionId,
        claimed: SubcategoryId,
        actual: SubcategoryId,
    },
}

//
// ─── REFERENCE DATA ────────────────────────────────────────────────────────────
//

/// A single rating prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub subcategory_id: SubcategoryId,
    pub text: String,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, subcategory_id: SubcategoryId, text: impl Into<String>) -> Self {
        Self {
            id,
            subcategory_id,
            text: text.into(),
        }
    }
}

/// A sub-dimension of a life area grouping several questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub life_area_id: LifeAreaId,
    pub name: String,
    pub questions: Vec<Question>,
}

impl Subcategory {
    #[must_use]
    pub fn new(
        id: SubcategoryId,
        life_area_id: LifeAreaId,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            life_area_id,
            name: name.into(),
            questions,
        }
    }

    pub fn question_ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.questions.iter().map(|q| q.id)
    }
}

/// Top-level life domain being rated. Each area is one wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeArea {
    pub id: LifeAreaId,
    pub name: String,
    pub description: Option<String>,
    /// CSS-style color used by the wheel, e.g. `#FF6B6B`.
    pub color: String,
    pub display_order: u32,
    pub subcategories: Vec<Subcategory>,
}

impl LifeArea {
    #[must_use]
    pub fn new(
        id: LifeAreaId,
        name: impl Into<String>,
        color: impl Into<String>,
        subcategories: Vec<Subcategory>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            color: color.into(),
            display_order: 0,
            subcategories,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_display_order(mut self, display_order: u32) -> Self {
        self.display_order = display_order;
        self
    }

    /// All questions of this area, in subcategory then question order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> + '_ {
        self.subcategories.iter().flat_map(|s| s.questions.iter())
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.subcategories.iter().map(|s| s.questions.len()).sum()
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Validated, ordered hierarchy of areas, subcategories and questions.
///
/// Areas are kept in the order given; that order defines the wizard steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    areas: Vec<LifeArea>,
    question_steps: HashMap<QuestionId, usize>,
}

impl Catalog {
    /// Builds a catalog, checking ids and parent links.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the hierarchy is empty at any level, has
    /// duplicate ids, or carries inconsistent parent ids.
    pub fn new(areas: Vec<LifeArea>) -> Result<Self, CatalogError> {
        if areas.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut area_ids = HashSet::new();
        let mut subcategory_ids = HashSet::new();
        let mut question_steps = HashMap::new();

        for (step, area) in areas.iter().enumerate() {
            if area.name.trim().is_empty() {
                return Err(CatalogError::EmptyAreaName);
            }
            if !area_ids.insert(area.id) {
                return Err(CatalogError::DuplicateArea(area.id));
            }
            if area.subcategories.is_empty() {
                return Err(CatalogError::EmptyArea(area.id));
            }

            for sub in &area.subcategories {
                if sub.life_area_id != area.id {
                    return Err(CatalogError::SubcategoryParentMismatch {
                        subcategory: sub.id,
                        claimed: sub.life_area_id,
                        actual: area.id,
                    });
                }
                if !subcategory_ids.insert(sub.id) {
                    return Err(CatalogError::DuplicateSubcategory(sub.id));
                }
                if sub.questions.is_empty() {
                    return Err(CatalogError::EmptySubcategory(sub.id));
                }

                for question in &sub.questions {
                    if question.subcategory_id != sub.id {
                        return Err(CatalogError::QuestionParentMismatch {
                            question: question.id,
                            claimed: question.subcategory_id,
                            actual: sub.id,
                        });
                    }
                    if question_steps.insert(question.id, step).is_some() {
                        return Err(CatalogError::DuplicateQuestion(question.id));
                    }
                }
            }
        }

        Ok(Self {
            areas,
            question_steps,
        })
    }

    #[must_use]
    pub fn areas(&self) -> &[LifeArea] {
        &self.areas
    }

    /// Number of wizard steps (one per area).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn area_at(&self, step: usize) -> Option<&LifeArea> {
        self.areas.get(step)
    }

    #[must_use]
    pub fn area(&self, id: LifeAreaId) -> Option<&LifeArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn contains_area(&self, id: LifeAreaId) -> bool {
        self.area(id).is_some()
    }

    #[must_use]
    pub fn contains_question(&self, id: QuestionId) -> bool {
        self.question_steps.contains_key(&id)
    }

    /// Step index of the area owning `question`.
    #[must_use]
    pub fn step_of(&self, question: QuestionId) -> Option<usize> {
        self.question_steps.get(&question).copied()
    }

    pub fn area_ids(&self) -> impl Iterator<Item = LifeAreaId> + '_ {
        self.areas.iter().map(|a| a.id)
    }

    pub fn subcategories(&self) -> impl Iterator<Item = &Subcategory> + '_ {
        self.areas.iter().flat_map(|a| a.subcategories.iter())
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_steps.len()
    }

    /// Consumes the catalog, returning the ordered areas.
    #[must_use]
    pub fn into_areas(self) -> Vec<LifeArea> {
        self.areas
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
