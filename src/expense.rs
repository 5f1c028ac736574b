// 💰 Expense Entry - Household ledger form
//
// A submitted entry is formatted into a confirmation message and dropped.
// Nothing is stored: persistence belongs to whatever consumes the message.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[default]
    Food,
    DailyGoods,
    Education,
    Social,
    Other,
}

impl ExpenseCategory {
    /// Selection order of the category widget
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Food,
        ExpenseCategory::DailyGoods,
        ExpenseCategory::Education,
        ExpenseCategory::Social,
        ExpenseCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "食費",
            ExpenseCategory::DailyGoods => "日用品",
            ExpenseCategory::Education => "教育費",
            ExpenseCategory::Social => "交際費",
            ExpenseCategory::Other => "その他",
        }
    }
}

// ============================================================================
// EXPENSE RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    /// Whole yen; the widget never allows negatives
    pub amount_yen: u64,
    #[serde(default)]
    pub memo: String,
}

impl ExpenseRecord {
    pub fn new(date: NaiveDate, category: ExpenseCategory, amount_yen: u64, memo: impl Into<String>) -> Self {
        ExpenseRecord {
            date,
            category,
            amount_yen,
            memo: memo.into(),
        }
    }

    /// Message shown after the form is submitted
    pub fn confirmation(&self) -> String {
        format!(
            "{} に {} : {}円 を記録しました（{}）",
            self.date.format("%Y-%m-%d"),
            self.category.label(),
            self.amount_yen,
            self.memo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_confirmation_message() {
        let record = ExpenseRecord::new(date(2024, 4, 1), ExpenseCategory::Food, 1280, "スーパー");

        assert_eq!(record.confirmation(), "2024-04-01 に 食費 : 1280円 を記録しました（スーパー）");
    }

    #[test]
    fn test_confirmation_with_empty_memo() {
        let record = ExpenseRecord::new(date(2024, 12, 31), ExpenseCategory::Other, 0, "");

        assert_eq!(record.confirmation(), "2024-12-31 に その他 : 0円 を記録しました（）");
    }

    #[test]
    fn test_category_labels_in_widget_order() {
        let labels: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["食費", "日用品", "教育費", "交際費", "その他"]);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&ExpenseCategory::DailyGoods).unwrap();
        assert_eq!(json, "\"daily_goods\"");
    }
}
