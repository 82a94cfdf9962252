//! Screen state for the app shell as an explicit value. The shell owns one
//! `ViewState` per screen and feeds every UI event through [`reduce`].

use serde::{Deserialize, Serialize};

use crate::progress::engine::LevelUp;
use crate::store::keys::CollectionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub collection: CollectionKind,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub collection: CollectionKind,
    pub selected: Option<SelectedItem>,
    pub detail_visible: bool,
    pub reset_confirm_visible: bool,
    pub loading: bool,
    /// Refresh control stays disabled while set.
    pub refreshing: bool,
    pub notice: Option<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            collection: CollectionKind::Kanji,
            selected: None,
            detail_visible: false,
            reset_confirm_visible: false,
            loading: false,
            refreshing: false,
            notice: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewAction {
    SwitchCollection(CollectionKind),
    Select(SelectedItem),
    CloseDetail,
    LoadStarted,
    LoadFinished,
    RefreshStarted,
    RefreshFinished { error: Option<String> },
    Leveled(LevelUp),
    AskResetConfirmation,
    CancelReset,
    ResetDone,
    DismissNotice,
}

/// Apply one action. Returns whether anything changed (i.e. a re-render is
/// needed).
pub fn reduce(state: &mut ViewState, action: ViewAction) -> bool {
    match action {
        ViewAction::SwitchCollection(kind) => {
            if state.collection == kind {
                return false;
            }
            state.collection = kind;
            state.selected = None;
            state.detail_visible = false;
            true
        }
        ViewAction::Select(item) => {
            state.collection = item.collection;
            state.selected = Some(item);
            state.detail_visible = true;
            true
        }
        ViewAction::CloseDetail => {
            let changed = state.detail_visible || state.selected.is_some();
            state.detail_visible = false;
            state.selected = None;
            changed
        }
        ViewAction::LoadStarted => !std::mem::replace(&mut state.loading, true),
        ViewAction::LoadFinished => std::mem::replace(&mut state.loading, false),
        ViewAction::RefreshStarted => {
            if state.refreshing {
                return false;
            }
            state.refreshing = true;
            true
        }
        ViewAction::RefreshFinished { error } => {
            state.refreshing = false;
            state.notice = error.map(|message| Notice {
                level: NoticeLevel::Error,
                message,
            });
            true
        }
        ViewAction::Leveled(level_up) => {
            if let Some(warning) = level_up.warning {
                state.notice = Some(Notice {
                    level: NoticeLevel::Warning,
                    message: format!("Words for {} could not be unlocked yet", warning.glyph),
                });
            }
            state.detail_visible = false;
            state.selected = None;
            true
        }
        ViewAction::AskResetConfirmation => !std::mem::replace(&mut state.reset_confirm_visible, true),
        ViewAction::CancelReset => std::mem::replace(&mut state.reset_confirm_visible, false),
        ViewAction::ResetDone => {
            *state = ViewState {
                collection: state.collection,
                notice: Some(Notice {
                    level: NoticeLevel::Info,
                    message: "All progress has been reset".to_string(),
                }),
                ..ViewState::default()
            };
            true
        }
        ViewAction::DismissNotice => state.notice.take().is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::engine::UnlockWarning;
    use crate::progress::Learnable;
    use crate::store::operations::kanji::Kanji;

    fn select(key: &str) -> ViewAction {
        ViewAction::Select(SelectedItem {
            collection: CollectionKind::Katakana,
            key: key.to_string(),
            index: None,
        })
    }

    #[test]
    fn selecting_opens_detail_and_switches_collection() {
        let mut state = ViewState::default();
        assert!(reduce(&mut state, select("ア")));
        assert!(state.detail_visible);
        assert_eq!(state.collection, CollectionKind::Katakana);

        assert!(reduce(&mut state, ViewAction::CloseDetail));
        assert!(!reduce(&mut state, ViewAction::CloseDetail));
    }

    #[test]
    fn refresh_is_single_flight() {
        let mut state = ViewState::default();
        assert!(reduce(&mut state, ViewAction::RefreshStarted));
        assert!(!reduce(&mut state, ViewAction::RefreshStarted));
        reduce(
            &mut state,
            ViewAction::RefreshFinished {
                error: Some("timeout".to_string()),
            },
        );
        assert!(!state.refreshing);
        assert_eq!(state.notice.as_ref().map(|n| n.level), Some(NoticeLevel::Error));
    }

    #[test]
    fn unlock_warning_becomes_notice() {
        let mut state = ViewState::default();
        let level_up = LevelUp {
            item: Kanji::new("一", "one").into_item(),
            previous_level: 0,
            unlock: None,
            warning: Some(UnlockWarning {
                code: "UNLOCK_FAILED",
                glyph: "一".to_string(),
                message: "timeout".to_string(),
            }),
        };
        assert!(reduce(&mut state, ViewAction::Leveled(level_up)));
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn reset_keeps_collection_and_clears_the_rest() {
        let mut state = ViewState::default();
        reduce(&mut state, select("イ"));
        reduce(&mut state, ViewAction::AskResetConfirmation);
        reduce(&mut state, ViewAction::ResetDone);
        assert_eq!(state.collection, CollectionKind::Katakana);
        assert!(state.selected.is_none());
        assert!(!state.reset_confirm_visible);
        assert!(state.notice.is_some());
    }
}
