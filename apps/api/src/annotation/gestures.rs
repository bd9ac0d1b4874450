//! Gesture dispatch: maps one presentation-layer input to one workspace
//! operation.

use serde::Deserialize;
use tracing::debug;

use crate::annotation::error::LabelingResult;
use crate::annotation::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    PrimaryClick {
        token_id: usize,
    },
    SecondaryClick {
        token_id: usize,
    },
    PointerDown {
        token_id: usize,
        #[serde(default)]
        ctrl: bool,
    },
    PointerMove {
        token_id: usize,
    },
    PointerUp,
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    DeleteSelection,
    Undo,
    SelectAll,
    ClearSelection,
}

impl KeyCommand {
    /// Key names follow `KeyboardEvent.key`.
    pub fn from_key(key: &str, ctrl: bool) -> Option<Self> {
        match key {
            "Delete" | "Backspace" => Some(KeyCommand::DeleteSelection),
            "Escape" => Some(KeyCommand::ClearSelection),
            k if ctrl && k.eq_ignore_ascii_case("z") => Some(KeyCommand::Undo),
            k if ctrl && k.eq_ignore_ascii_case("a") => Some(KeyCommand::SelectAll),
            _ => None,
        }
    }
}

impl Workspace {
    pub fn dispatch(&mut self, gesture: Gesture) -> LabelingResult<()> {
        debug!(?gesture, "Dispatching gesture");
        match gesture {
            Gesture::PrimaryClick { token_id } => {
                if self.has_selection() {
                    self.apply_active_label().map(|_| ())
                } else {
                    self.label_token(token_id)
                }
            }
            Gesture::SecondaryClick { token_id } => {
                if !self.is_selected(token_id) {
                    self.select_token(token_id)?;
                }
                self.delete_selection().map(|_| ())
            }
            Gesture::PointerDown { token_id, ctrl } => self.pointer_down(token_id, ctrl),
            Gesture::PointerMove { token_id } => self.pointer_move(token_id),
            Gesture::PointerUp => self.pointer_up(),
            Gesture::Key { key, ctrl } => match KeyCommand::from_key(&key, ctrl) {
                Some(KeyCommand::DeleteSelection) => self.delete_selection().map(|_| ()),
                Some(KeyCommand::Undo) => self.undo().map(|_| ()),
                Some(KeyCommand::SelectAll) => self.select_all(),
                Some(KeyCommand::ClearSelection) => self.clear_selection(),
                None => Ok(()),
            },
        }
    }
}
