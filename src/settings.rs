// ⚙️ Settings - Theme selection
//
// The choice only lives for the current session. Front-ends decide how (and
// whether) to apply it; a reload may be needed for it to take effect.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "ライト",
            Theme::Dark => "ダーク",
        }
    }
}

pub fn selected_theme_message(theme: Theme) -> String {
    format!("選択中のテーマ：{}", theme.label())
}

pub const RELOAD_NOTICE: &str = "※ 見た目の切り替えには再読み込みが必要な場合があります";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_labels() {
        assert_eq!(Theme::Light.label(), "ライト");
        assert_eq!(Theme::Dark.label(), "ダーク");
    }

    #[test]
    fn test_selected_theme_message() {
        assert_eq!(selected_theme_message(Theme::Dark), "選択中のテーマ：ダーク");
    }
}
