//! Label Registry: the available labels and the active one.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::annotation::error::{LabelingError, LabelingResult};

pub const UNLABELED_ID: &str = "unlabeled";
pub const UNLABELED_NAME: &str = "Unlabeled";
const UNLABELED_COLOR: &str = "#666";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default = "default_deletable")]
    pub is_deletable: bool,
}

fn default_deletable() -> bool {
    true
}

impl Label {
    fn unlabeled() -> Self {
        Self {
            id: UNLABELED_ID.to_string(),
            name: UNLABELED_NAME.to_string(),
            color: UNLABELED_COLOR.to_string(),
            is_deletable: false,
        }
    }

    /// The string written to a token's `label` when this label is applied.
    /// The sentinel clears the token.
    pub fn token_value(&self) -> &str {
        if self.id == UNLABELED_ID {
            ""
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelRegistry {
    labels: Vec<Label>,
    active: Option<String>,
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self {
            labels: vec![Label::unlabeled()],
            active: None,
        }
    }
}

impl LabelRegistry {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn active(&self) -> Option<&Label> {
        let id = self.active.as_deref()?;
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Appends a new label. Names are trimmed and compared case-sensitively.
    pub fn create_label(&mut self, name: &str, color: &str) -> LabelingResult<&Label> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelingError::InvalidName);
        }
        if self.find_by_name(name).is_some() {
            return Err(LabelingError::DuplicateName(name.to_string()));
        }

        let label = Label {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: color.to_string(),
            is_deletable: true,
        };
        debug!("Created label '{}' ({})", label.name, label.id);
        self.labels.push(label);
        Ok(&self.labels[self.labels.len() - 1])
    }

    /// Removes a label. Returns the removed label, or `None` when the label
    /// is protected and the call was ignored.
    pub fn delete_label(&mut self, id: &str) -> LabelingResult<Option<Label>> {
        let index = self
            .labels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LabelingError::NotFound(format!("Label {id}")))?;

        if !self.labels[index].is_deletable {
            return Ok(None);
        }

        let removed = self.labels.remove(index);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Ok(Some(removed))
    }

    pub fn select_active(&mut self, id: &str) -> LabelingResult<&Label> {
        let index = self
            .labels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LabelingError::NotFound(format!("Label {id}")))?;
        self.active = Some(id.to_string());
        Ok(&self.labels[index])
    }
}
