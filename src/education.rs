// 📘 Education Cost Projection - Per-child schooling timeline and total cost
//
// Costs are in 万円 (units of 10,000 yen). The table and track mappings are
// fixed; every (tier, level) pair is covered by an exhaustive match, so there
// is no "unknown track" fallback.
//
// Start year of a level j for a child of age `a`:
//     current_year + (6 − a) + sum(DURATIONS[..j])
// The arithmetic is unconditional: a 17-year-old gets an elementary start
// year in the past, which is accepted.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const MAX_CHILDREN: usize = 5;
pub const MIN_CHILD_AGE: u8 = 0;
pub const MAX_CHILD_AGE: u8 = 18;
pub const DEFAULT_CHILD_AGE: u8 = 6;

/// Age at which elementary school begins
pub const SCHOOL_START_AGE: i32 = 6;

/// Years spent in each level before moving on. University is last, so its
/// duration never offsets anything.
pub const LEVEL_DURATIONS: [i32; 4] = [6, 3, 3, 0];

// ============================================================================
// TIER / LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Public,
    Private,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Public => "公立",
            Tier::Private => "私立",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Elementary,
    JuniorHigh,
    HighSchool,
    University,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Elementary, Level::JuniorHigh, Level::HighSchool, Level::University];

    pub fn label(&self) -> &'static str {
        match self {
            Level::Elementary => "小学校",
            Level::JuniorHigh => "中学校",
            Level::HighSchool => "高校",
            Level::University => "大学",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Level::Elementary => 0,
            Level::JuniorHigh => 1,
            Level::HighSchool => 2,
            Level::University => 3,
        }
    }

    /// Years from elementary entry until this level begins
    pub fn start_offset(&self) -> i32 {
        LEVEL_DURATIONS[..self.index()].iter().sum()
    }
}

/// Cost table in 万円
pub fn cost(tier: Tier, level: Level) -> u32 {
    match (tier, level) {
        (Tier::Public, Level::Elementary) => 50,
        (Tier::Public, Level::JuniorHigh) => 70,
        (Tier::Public, Level::HighSchool) => 100,
        (Tier::Public, Level::University) => 300,
        (Tier::Private, Level::Elementary) => 150,
        (Tier::Private, Level::JuniorHigh) => 200,
        (Tier::Private, Level::HighSchool) => 300,
        (Tier::Private, Level::University) => 600,
    }
}

// ============================================================================
// TRACK
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationTrack {
    #[default]
    AllPublic,
    PrivateFromJuniorHigh,
    PrivateFromHighSchool,
    PrivateFromUniversity,
    AllPrivate,
}

impl EducationTrack {
    pub const ALL: [EducationTrack; 5] = [
        EducationTrack::AllPublic,
        EducationTrack::PrivateFromJuniorHigh,
        EducationTrack::PrivateFromHighSchool,
        EducationTrack::PrivateFromUniversity,
        EducationTrack::AllPrivate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EducationTrack::AllPublic => "すべて公立",
            EducationTrack::PrivateFromJuniorHigh => "中学から私立",
            EducationTrack::PrivateFromHighSchool => "高校から私立",
            EducationTrack::PrivateFromUniversity => "大学から私立",
            EducationTrack::AllPrivate => "すべて私立",
        }
    }

    /// Tier for each level, in `Level::ALL` order
    pub fn tiers(&self) -> [Tier; 4] {
        use Tier::{Private, Public};

        match self {
            EducationTrack::AllPublic => [Public, Public, Public, Public],
            EducationTrack::PrivateFromJuniorHigh => [Public, Private, Private, Private],
            EducationTrack::PrivateFromHighSchool => [Public, Public, Private, Private],
            EducationTrack::PrivateFromUniversity => [Public, Public, Public, Private],
            EducationTrack::AllPrivate => [Private, Private, Private, Private],
        }
    }

    pub fn tier_for(&self, level: Level) -> Tier {
        self.tiers()[level.index()]
    }
}

// ============================================================================
// INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationInputs {
    pub track: EducationTrack,
    /// Current age of each child; the length is the child count
    #[serde(deserialize_with = "saturating_ages")]
    pub child_ages: Vec<u8>,
}

fn saturating_ages<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let ages = Vec::<i64>::deserialize(deserializer)?;
    Ok(ages
        .into_iter()
        .map(|age| u8::try_from(age.max(0)).unwrap_or(u8::MAX))
        .collect())
}

impl Default for EducationInputs {
    fn default() -> Self {
        EducationInputs {
            track: EducationTrack::default(),
            child_ages: vec![DEFAULT_CHILD_AGE],
        }
    }
}

impl EducationInputs {
    /// Apply the widget bounds (0–5 children, ages 0–18)
    pub fn clamped(mut self) -> Self {
        self.child_ages.truncate(MAX_CHILDREN);
        for age in &mut self.child_ages {
            *age = (*age).clamp(MIN_CHILD_AGE, MAX_CHILD_AGE);
        }
        self
    }

    /// Resize to `count` children, new children starting at the default age
    pub fn set_child_count(&mut self, count: usize) {
        self.child_ages.resize(count.min(MAX_CHILDREN), DEFAULT_CHILD_AGE);
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCost {
    pub year: i32,
    pub level: Level,
    pub tier: Tier,
    /// 万円
    pub cost: u32,
}

impl StageCost {
    /// e.g. "2031年 - 中学校（私立）: 200万円"
    pub fn display(&self) -> String {
        format!("{}年 - {}（{}）: {}万円", self.year, self.level.label(), self.tier.label(), self.cost)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProjection {
    pub age: u8,
    pub stages: Vec<StageCost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationProjection {
    pub children: Vec<ChildProjection>,
    /// 万円, across all children and levels
    pub total_cost: u32,
}

impl EducationProjection {
    pub fn total_display(&self) -> String {
        format!("{} 万円", self.total_cost)
    }
}

/// Stages for a single child
pub fn project_child(age: u8, track: EducationTrack, current_year: i32) -> ChildProjection {
    let entry_year = current_year + (SCHOOL_START_AGE - age as i32);

    let stages = Level::ALL
        .iter()
        .map(|&level| {
            let tier = track.tier_for(level);
            StageCost {
                year: entry_year + level.start_offset(),
                level,
                tier,
                cost: cost(tier, level),
            }
        })
        .collect();

    ChildProjection { age, stages }
}

pub fn project(inputs: &EducationInputs, current_year: i32) -> EducationProjection {
    let children: Vec<ChildProjection> = inputs
        .child_ages
        .iter()
        .map(|&age| project_child(age, inputs.track, current_year))
        .collect();

    let total_cost = children
        .iter()
        .flat_map(|child| child.stages.iter())
        .map(|stage| stage.cost)
        .sum();

    EducationProjection { children, total_cost }
}
