// 🧭 Panel Dispatcher - One mode in, one rendered panel out
//
// render(mode, inputs) is evaluated once per interaction. It holds no state:
// the caller keeps the current mode and form values and passes them in every
// time. Only the Deals panel touches the outside world (through DealsSource).

use crate::calorie::{self, CalorieInputs};
use crate::deals::{self, DealsFeed, DealsSource};
use crate::education::{self, EducationInputs};
use crate::expense::ExpenseRecord;
use crate::schedule::ScheduleRecord;
use crate::settings::{self, Theme};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// APP MODE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Recommendation,
    Diet,
    Budget,
    Schedule,
    Education,
    Deals,
    Settings,
}

impl AppMode {
    /// Side menu order
    pub const ALL: [AppMode; 7] = [
        AppMode::Recommendation,
        AppMode::Diet,
        AppMode::Budget,
        AppMode::Schedule,
        AppMode::Education,
        AppMode::Deals,
        AppMode::Settings,
    ];

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            AppMode::Recommendation => "今日のおすすめ",
            AppMode::Diet => "ダイエット管理",
            AppMode::Budget => "家計簿",
            AppMode::Schedule => "スケジュール",
            AppMode::Education => "教育費・人生設計",
            AppMode::Deals => "お得情報",
            AppMode::Settings => "設定",
        }
    }

    /// Panel header
    pub fn title(&self) -> &'static str {
        match self {
            AppMode::Recommendation => "🌞 今日のおすすめメニュー",
            AppMode::Diet => "⚖️ ダイエット管理",
            AppMode::Budget => "💰 家計簿入力",
            AppMode::Schedule => "🗓 スケジュール登録",
            AppMode::Education => "📘 教育費・人生プラン",
            AppMode::Deals => "📢 地域のお得情報",
            AppMode::Settings => "⚙️ アプリ設定",
        }
    }

    /// Wire / CLI name, same as the serde name
    pub fn key(&self) -> &'static str {
        match self {
            AppMode::Recommendation => "recommendation",
            AppMode::Diet => "diet",
            AppMode::Budget => "budget",
            AppMode::Schedule => "schedule",
            AppMode::Education => "education",
            AppMode::Deals => "deals",
            AppMode::Settings => "settings",
        }
    }

    /// Accepts either the key or the menu label
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == s || m.label() == s)
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub const RECOMMENDATIONS: [&str; 3] = [
    "✅ 朝：オートミールとゆで卵",
    "✅ 運動：スクワット10回 × 3セット",
    "✅ 家計ワンポイント：特売チラシを確認して買い物はまとめて！",
];

pub const BMR_CAPTION: &str = "※ BMRは活動量1.5で計算";

pub const REGION_SELECT_LABEL: &str = "地域を選択";
pub const CATEGORY_SELECT_LABEL: &str = "カテゴリを選択";

// ============================================================================
// RENDER BOUNDARY
// ============================================================================

/// One output primitive of a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelLine {
    Text { text: String },
    Caption { text: String },
    Metric { label: String, value: String },
    Success { text: String },
    Error { text: String },
    Bullet { text: String },
    /// Options that only exist once data is loaded (deals regions/categories)
    Select { label: String, options: Vec<String>, selected: Option<String> },
}

impl PanelLine {
    pub fn text(text: impl Into<String>) -> Self {
        PanelLine::Text { text: text.into() }
    }

    pub fn caption(text: impl Into<String>) -> Self {
        PanelLine::Caption { text: text.into() }
    }

    pub fn metric(label: impl Into<String>, value: impl Into<String>) -> Self {
        PanelLine::Metric { label: label.into(), value: value.into() }
    }

    pub fn plain(&self) -> String {
        match self {
            PanelLine::Text { text } | PanelLine::Caption { text } | PanelLine::Bullet { text } => text.clone(),
            PanelLine::Success { text } => format!("✔ {}", text),
            PanelLine::Error { text } => format!("✖ {}", text),
            PanelLine::Metric { label, value } => format!("{}: {}", label, value),
            PanelLine::Select { label, selected, .. } => {
                format!("{}: {}", label, selected.as_deref().unwrap_or("-"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    pub mode: AppMode,
    pub title: String,
    pub lines: Vec<PanelLine>,
}

impl PanelView {
    fn new(mode: AppMode) -> Self {
        PanelView {
            mode,
            title: mode.title().to_string(),
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: PanelLine) {
        self.lines.push(line);
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            PanelLine::Error { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            PanelLine::Bullet { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for line in &self.lines {
            out.push_str(&line.plain());
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// FORM INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseForm {
    pub record: ExpenseRecord,
    #[serde(default)]
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub record: ScheduleRecord,
    #[serde(default)]
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealsQuery {
    pub sheet_url: String,
    pub region: Option<String>,
    pub category: Option<String>,
}

/// Current value of every widget on every panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInputs {
    pub diet: CalorieInputs,
    pub budget: ExpenseForm,
    pub schedule: ScheduleForm,
    pub education: EducationInputs,
    pub deals: DealsQuery,
    pub theme: Theme,
}

impl PanelInputs {
    /// Widget defaults, with date fields set to `today`
    pub fn for_date(today: NaiveDate, sheet_url: &str) -> Self {
        PanelInputs {
            diet: CalorieInputs::default(),
            budget: ExpenseForm {
                record: ExpenseRecord::new(today, Default::default(), 0, ""),
                submitted: false,
            },
            schedule: ScheduleForm {
                record: ScheduleRecord::new(today, ""),
                submitted: false,
            },
            education: EducationInputs::default(),
            deals: DealsQuery {
                sheet_url: sheet_url.to_string(),
                region: None,
                category: None,
            },
            theme: Theme::default(),
        }
    }

    /// Apply the widget bounds to every numeric field
    pub fn clamped(mut self) -> Self {
        self.diet = self.diet.clamped();
        self.education = self.education.clamped();
        self
    }
}

impl Default for PanelInputs {
    fn default() -> Self {
        Self::for_date(Local::now().date_naive(), crate::config::DEFAULT_SHEET_URL)
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Render exactly one panel for the given mode
pub fn render(mode: AppMode, inputs: &PanelInputs, source: &dyn DealsSource, current_year: i32) -> PanelView {
    debug!(?mode, "render panel");

    match mode {
        AppMode::Recommendation => render_recommendation(),
        AppMode::Diet => render_diet(&inputs.diet),
        AppMode::Budget => render_budget(&inputs.budget),
        AppMode::Schedule => render_schedule(&inputs.schedule),
        AppMode::Education => render_education(&inputs.education, current_year),
        AppMode::Deals => render_deals(&inputs.deals, source),
        AppMode::Settings => render_settings(inputs.theme),
    }
}

fn render_recommendation() -> PanelView {
    let mut view = PanelView::new(AppMode::Recommendation);
    for tip in RECOMMENDATIONS {
        view.push(PanelLine::text(tip));
    }
    view
}

fn render_diet(inputs: &CalorieInputs) -> PanelView {
    let mut view = PanelView::new(AppMode::Diet);
    let result = calorie::calculate(inputs);

    view.push(PanelLine::metric("目標摂取カロリー", result.display()));
    view.push(PanelLine::caption(BMR_CAPTION));
    view
}

fn render_budget(form: &ExpenseForm) -> PanelView {
    let mut view = PanelView::new(AppMode::Budget);
    if form.submitted {
        view.push(PanelLine::Success { text: form.record.confirmation() });
    }
    view
}

fn render_schedule(form: &ScheduleForm) -> PanelView {
    let mut view = PanelView::new(AppMode::Schedule);
    if form.submitted {
        view.push(PanelLine::Success { text: form.record.confirmation() });
    }
    view
}

fn render_education(inputs: &EducationInputs, current_year: i32) -> PanelView {
    let mut view = PanelView::new(AppMode::Education);
    let projection = education::project(inputs, current_year);

    for (i, child) in projection.children.iter().enumerate() {
        view.push(PanelLine::caption(format!("子ども{}（{}歳）", i + 1, child.age)));
        for stage in &child.stages {
            view.push(PanelLine::text(stage.display()));
        }
    }

    view.push(PanelLine::metric("想定教育費合計", projection.total_display()));
    view
}

fn render_deals(query: &DealsQuery, source: &dyn DealsSource) -> PanelView {
    let mut view = PanelView::new(AppMode::Deals);

    let feed = match source.fetch(&query.sheet_url) {
        Ok(rows) => DealsFeed::new(rows),
        Err(error) => {
            view.push(PanelLine::Error { text: error.user_message().to_string() });
            return view;
        }
    };

    let regions = feed.regions();
    let categories = feed.categories();
    let region = deals::resolve_selection(&regions, query.region.as_deref());
    let category = deals::resolve_selection(&categories, query.category.as_deref());

    view.push(PanelLine::Select {
        label: REGION_SELECT_LABEL.to_string(),
        options: regions,
        selected: region.clone(),
    });
    view.push(PanelLine::Select {
        label: CATEGORY_SELECT_LABEL.to_string(),
        options: categories,
        selected: category.clone(),
    });

    if let (Some(region), Some(category)) = (region, category) {
        for (content, note) in feed.filter(&region, &category) {
            view.push(PanelLine::Bullet { text: deals::format_deal(content, note) });
        }
    }

    view
}

fn render_settings(theme: Theme) -> PanelView {
    let mut view = PanelView::new(AppMode::Settings);
    view.push(PanelLine::text(settings::selected_theme_message(theme)));
    view.push(PanelLine::caption(settings::RELOAD_NOTICE));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::{DealsError, DealsRow, StaticSource, RETRIEVAL_FAILURE_MESSAGE};
    use crate::education::EducationTrack;
    use crate::expense::ExpenseCategory;
    use pretty_assertions::assert_eq;

    struct FailingSource(fn() -> DealsError);

    impl DealsSource for FailingSource {
        fn fetch(&self, _url: &str) -> Result<Vec<DealsRow>, DealsError> {
            Err((self.0)())
        }
    }

    fn inputs() -> PanelInputs {
        PanelInputs::for_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), "deals.csv")
    }

    fn sample_source() -> StaticSource {
        StaticSource::new(vec![
            DealsRow::new("A", "food", "c1", "n1"),
            DealsRow::new("A", "toys", "c2", "n2"),
            DealsRow::new("B", "food", "c3", "n3"),
        ])
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(AppMode::Recommendation.next(), AppMode::Diet);
        assert_eq!(AppMode::Settings.next(), AppMode::Recommendation);
        assert_eq!(AppMode::Recommendation.previous(), AppMode::Settings);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(AppMode::parse("diet"), Some(AppMode::Diet));
        assert_eq!(AppMode::parse("お得情報"), Some(AppMode::Deals));
        assert_eq!(AppMode::parse("unknown"), None);
    }

    #[test]
    fn test_mode_key_matches_serde_name() {
        for mode in AppMode::ALL {
            assert_eq!(serde_json::to_value(mode).unwrap(), serde_json::json!(mode.key()));
        }
    }

    #[test]
    fn test_default_mode_is_recommendation() {
        assert_eq!(AppMode::default(), AppMode::Recommendation);
    }

    #[test]
    fn test_recommendation_panel() {
        let view = render(AppMode::Recommendation, &inputs(), &sample_source(), 2025);

        assert_eq!(view.title, "🌞 今日のおすすめメニュー");
        assert_eq!(view.lines.len(), 3);
        assert_eq!(view.lines[0], PanelLine::text(RECOMMENDATIONS[0]));
    }

    #[test]
    fn test_diet_panel() {
        let view = render(AppMode::Diet, &inputs(), &sample_source(), 2025);

        assert_eq!(view.lines[0], PanelLine::metric("目標摂取カロリー", "694 kcal/日"));
        assert_eq!(view.lines[1], PanelLine::caption(BMR_CAPTION));
    }

    #[test]
    fn test_budget_panel_only_confirms_after_submit() {
        let mut inputs = inputs();
        let view = render(AppMode::Budget, &inputs, &sample_source(), 2025);
        assert!(view.lines.is_empty());

        inputs.budget.record = ExpenseRecord::new(inputs.budget.record.date, ExpenseCategory::Social, 3000, "ランチ");
        inputs.budget.submitted = true;
        let view = render(AppMode::Budget, &inputs, &sample_source(), 2025);

        assert_eq!(
            view.lines,
            vec![PanelLine::Success { text: "2025-04-01 に 交際費 : 3000円 を記録しました（ランチ）".to_string() }]
        );
    }

    #[test]
    fn test_schedule_panel() {
        let mut inputs = inputs();
        inputs.schedule.record.description = "歯医者".to_string();
        inputs.schedule.submitted = true;

        let view = render(AppMode::Schedule, &inputs, &sample_source(), 2025);

        assert_eq!(view.lines, vec![PanelLine::Success { text: "2025-04-01 に『歯医者』を登録しました".to_string() }]);
    }

    #[test]
    fn test_education_panel() {
        let mut inputs = inputs();
        inputs.education = EducationInputs { track: EducationTrack::AllPublic, child_ages: vec![6] };

        let view = render(AppMode::Education, &inputs, &sample_source(), 2025);

        assert_eq!(view.lines[1], PanelLine::text("2025年 - 小学校（公立）: 50万円"));
        assert_eq!(view.lines.last(), Some(&PanelLine::metric("想定教育費合計", "520 万円")));
    }

    #[test]
    fn test_education_panel_without_children() {
        let mut inputs = inputs();
        inputs.education.set_child_count(0);

        let view = render(AppMode::Education, &inputs, &sample_source(), 2025);

        assert_eq!(view.lines, vec![PanelLine::metric("想定教育費合計", "0 万円")]);
    }

    #[test]
    fn test_deals_panel_filters_selection() {
        let mut inputs = inputs();
        inputs.deals.region = Some("A".to_string());
        inputs.deals.category = Some("food".to_string());

        let view = render(AppMode::Deals, &inputs, &sample_source(), 2025);

        assert_eq!(view.bullets().collect::<Vec<_>>(), vec!["- c1（n1）"]);
        assert_eq!(view.errors().count(), 0);
    }

    #[test]
    fn test_deals_panel_defaults_to_first_options() {
        let view = render(AppMode::Deals, &inputs(), &sample_source(), 2025);

        assert_eq!(
            view.lines[0],
            PanelLine::Select {
                label: "地域を選択".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                selected: Some("A".to_string()),
            }
        );
        assert_eq!(view.bullets().count(), 1);
    }

    #[test]
    fn test_deals_failure_collapses_to_one_message() {
        let failures: [fn() -> DealsError; 3] = [
            || DealsError::Network("dns".to_string()),
            || DealsError::Status(500),
            || DealsError::Parse("missing field `備考`".to_string()),
        ];

        for failure in failures {
            let view = render(AppMode::Deals, &inputs(), &FailingSource(failure), 2025);

            assert_eq!(view.errors().collect::<Vec<_>>(), vec![RETRIEVAL_FAILURE_MESSAGE]);
            assert_eq!(view.bullets().count(), 0);
            assert_eq!(view.lines.len(), 1);
        }
    }

    #[test]
    fn test_settings_panel() {
        let mut inputs = inputs();
        inputs.theme = Theme::Dark;

        let view = render(AppMode::Settings, &inputs, &sample_source(), 2025);

        assert_eq!(view.lines[0], PanelLine::text("選択中のテーマ：ダーク"));
    }

    #[test]
    fn test_every_panel_is_idempotent() {
        let inputs = inputs();
        let source = sample_source();

        for mode in AppMode::ALL {
            assert_eq!(render(mode, &inputs, &source, 2025), render(mode, &inputs, &source, 2025));
        }
    }

    #[test]
    fn test_partial_inputs_deserialize_with_defaults() {
        let inputs: PanelInputs = serde_json::from_str(r#"{"diet": {"current_weight_kg": 70.0, "target_weight_kg": 65.0, "weeks": 8}}"#).unwrap();

        assert_eq!(inputs.diet.weeks, 8);
        assert_eq!(inputs.education, EducationInputs::default());
    }

    #[test]
    fn test_plain_text() {
        let view = render(AppMode::Diet, &inputs(), &sample_source(), 2025);

        assert_eq!(view.to_plain_text(), "⚖️ ダイエット管理\n目標摂取カロリー: 694 kcal/日\n※ BMRは活動量1.5で計算\n");
    }
}
