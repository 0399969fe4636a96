use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::LifeAreaId;

/// Total number of contribution points a user distributes across areas.
pub const POINT_BUDGET: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocationError {
    #[error("contribution points must be between 0 and 100, got {0}")]
    OutOfRange(i64),

    #[error("contribution points are not a whole number: {0:?}")]
    NotANumber(String),

    #[error("life area {0} is not part of this allocation")]
    UnknownArea(LifeAreaId),

    #[error("contribution points must sum to exactly 100, got {total}")]
    InvalidTotal { total: u32 },
}

/// Distribution of the 100 point budget across life areas.
///
/// Individual values are always within `0..=100`; only the sum may be off
/// while the user is still editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionAllocation {
    points: BTreeMap<LifeAreaId, u32>,
}

impl ContributionAllocation {
    /// Starts every area at zero points.
    #[must_use]
    pub fn for_areas(areas: impl IntoIterator<Item = LifeAreaId>) -> Self {
        Self {
            points: areas.into_iter().map(|id| (id, 0)).collect(),
        }
    }

    /// Rebuilds an allocation from stored values.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::OutOfRange` if any stored value exceeds the budget.
    pub fn from_persisted(
        points: impl IntoIterator<Item = (LifeAreaId, u32)>,
    ) -> Result<Self, AllocationError> {
        let mut out = BTreeMap::new();
        for (area, value) in points {
            if value > POINT_BUDGET {
                return Err(AllocationError::OutOfRange(i64::from(value)));
            }
            out.insert(area, value);
        }
        Ok(Self { points: out })
    }

    /// Sets one area's points.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::OutOfRange` for values outside `0..=100` and
    /// `AllocationError::UnknownArea` for areas not in the allocation. The
    /// previous value is kept in both cases.
    pub fn set_points(&mut self, area: LifeAreaId, value: i64) -> Result<(), AllocationError> {
        let value = u32::try_from(value)
            .ok()
            .filter(|v| *v <= POINT_BUDGET)
            .ok_or(AllocationError::OutOfRange(value))?;
        let slot = self
            .points
            .get_mut(&area)
            .ok_or(AllocationError::UnknownArea(area))?;
        *slot = value;
        Ok(())
    }

    /// Parses and applies raw text input. Blank input counts as zero.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_points`], plus `NotANumber` for non-integer input.
    pub fn set_points_from_input(
        &mut self,
        area: LifeAreaId,
        raw: &str,
    ) -> Result<(), AllocationError> {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            0
        } else {
            trimmed
                .parse::<i64>()
                .map_err(|_| AllocationError::NotANumber(raw.to_string()))?
        };
        self.set_points(area, value)
    }

    #[must_use]
    pub fn points(&self, area: LifeAreaId) -> Option<u32> {
        self.points.get(&area).copied()
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.points.values().sum()
    }

    /// Points still to distribute; negative when over budget.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        i64::from(POINT_BUDGET) - i64::from(self.total())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.total() == POINT_BUDGET
    }

    /// # Errors
    ///
    /// Returns `AllocationError::InvalidTotal` unless the points sum to 100.
    pub fn validate(&self) -> Result<(), AllocationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AllocationError::InvalidTotal {
                total: self.total(),
            })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LifeAreaId, u32)> + '_ {
        self.points.iter().map(|(a, p)| (*a, *p))
    }
}
