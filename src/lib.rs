// ShufuMate - Core Library
// Household panels (diet, budget, schedule, education, deals, settings)
// exposed for the TUI, the API server, and tests

pub mod calorie;
pub mod config;
pub mod deals;
pub mod education;
pub mod expense;
pub mod logging;
pub mod panel;
pub mod schedule;
pub mod settings;

// Re-export commonly used types
pub use calorie::{CalorieInputs, CalorieResult};
pub use config::{load_config, AppConfig, LoadedConfig};
pub use deals::{CsvSource, DealsError, DealsFeed, DealsRow, DealsSource, StaticSource};
pub use education::{
    ChildProjection, EducationInputs, EducationProjection, EducationTrack, Level, StageCost, Tier,
};
pub use expense::{ExpenseCategory, ExpenseRecord};
pub use panel::{render, AppMode, DealsQuery, ExpenseForm, PanelInputs, PanelLine, PanelView, ScheduleForm};
pub use schedule::ScheduleRecord;
pub use settings::Theme;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
