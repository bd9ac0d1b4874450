//! Labeling Engine: applies the active label to selected tokens.
//!
//! Both entry points validate everything before touching the store, so a
//! rejected call never leaves a partially labeled selection behind.

use crate::annotation::error::{LabelingError, LabelingResult};
use crate::annotation::labels::LabelRegistry;
use crate::annotation::selection::Selection;
use crate::annotation::token_store::TokenStore;

/// Writes the active label to every selected token and clears the selection.
///
/// With an empty selection this is a no-op returning 0; labeling the token
/// under the cursor is the caller's fallback (see `label_token`).
pub fn apply_active_label(
    store: &mut TokenStore,
    selection: &mut Selection,
    registry: &LabelRegistry,
) -> LabelingResult<usize> {
    let label = registry.active().ok_or(LabelingError::NoActiveLabel)?;
    if selection.is_empty() {
        return Ok(0);
    }

    if let Some(stale) = selection.ids().iter().find(|id| !store.contains(**id)) {
        return Err(LabelingError::NotFound(format!("Token {stale}")));
    }

    let value = label.token_value();
    for id in selection.ids() {
        store.set_label(*id, value)?;
    }

    let applied = selection.len();
    selection.clear();
    Ok(applied)
}

/// Writes the active label to a single token.
pub fn label_token(store: &mut TokenStore, registry: &LabelRegistry, id: usize) -> LabelingResult<()> {
    let label = registry.active().ok_or(LabelingError::NoActiveLabel)?;
    store.set_label(id, label.token_value())
}
