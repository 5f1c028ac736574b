// ⚖️ Calorie Target - Diet panel arithmetic
//
// basal   = weight × 22 × 1.5   (activity factor 1.5)
// deficit = (weight − target) × 7200 / (weeks × 7)
// target  = basal − deficit
//
// Results are NOT clamped: a target weight above the current weight inflates
// the daily target, and very short periods can push it below zero.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// kcal per kg of body weight per day at rest
pub const BASAL_KCAL_PER_KG: f64 = 22.0;

/// Activity multiplier applied on top of the basal rate
pub const ACTIVITY_FACTOR: f64 = 1.5;

/// kcal stored in one kg of body fat
pub const KCAL_PER_KG_FAT: f64 = 7200.0;

pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 200.0;
pub const MIN_WEEKS: u32 = 1;
pub const MAX_WEEKS: u32 = 52;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieInputs {
    pub current_weight_kg: f64,
    pub target_weight_kg: f64,
    #[serde(deserialize_with = "saturating_weeks")]
    pub weeks: u32,
}

impl Default for CalorieInputs {
    fn default() -> Self {
        CalorieInputs {
            current_weight_kg: 60.0,
            target_weight_kg: 55.0,
            weeks: 4,
        }
    }
}

impl CalorieInputs {
    /// Apply the widget bounds (weights 30–200 kg, 1–52 weeks)
    pub fn clamped(self) -> Self {
        CalorieInputs {
            current_weight_kg: clamp_weight(self.current_weight_kg),
            target_weight_kg: clamp_weight(self.target_weight_kg),
            weeks: self.weeks.clamp(MIN_WEEKS, MAX_WEEKS),
        }
    }
}

/// Any integer is accepted; `clamped` brings it into the widget range
fn saturating_weeks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let weeks = i64::deserialize(deserializer)?;
    Ok(u32::try_from(weeks.max(0)).unwrap_or(u32::MAX))
}

fn clamp_weight(kg: f64) -> f64 {
    if kg.is_nan() {
        return MIN_WEIGHT_KG;
    }
    kg.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieResult {
    pub daily_calorie_target_kcal: f64,
}

impl CalorieResult {
    /// Metric value as shown on the panel, e.g. "694 kcal/日"
    pub fn display(&self) -> String {
        format!("{:.0} kcal/日", self.daily_calorie_target_kcal)
    }
}

// ============================================================================
// CALCULATION
// ============================================================================

pub fn basal_rate(current_weight_kg: f64) -> f64 {
    current_weight_kg * BASAL_KCAL_PER_KG * ACTIVITY_FACTOR
}

/// Daily deficit needed to reach the target in `weeks` weeks.
/// `weeks` must be ≥ 1.
pub fn daily_deficit(current_weight_kg: f64, target_weight_kg: f64, weeks: u32) -> f64 {
    ((current_weight_kg - target_weight_kg) * KCAL_PER_KG_FAT) / (weeks as f64 * 7.0)
}

pub fn calculate(inputs: &CalorieInputs) -> CalorieResult {
    let basal = basal_rate(inputs.current_weight_kg);
    let deficit = daily_deficit(inputs.current_weight_kg, inputs.target_weight_kg, inputs.weeks);

    CalorieResult {
        daily_calorie_target_kcal: basal - deficit,
    }
}
