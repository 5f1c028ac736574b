// 🗓 Schedule Entry - same lifecycle as an expense entry: format, confirm, drop

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl ScheduleRecord {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        ScheduleRecord {
            date,
            description: description.into(),
        }
    }

    pub fn confirmation(&self) -> String {
        format!("{} に『{}』を登録しました", self.date.format("%Y-%m-%d"), self.description)
    }
}
