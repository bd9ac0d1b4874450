// Token labeling core: store, labels, selection, undo, labeling engine.
// The workspace ties them together; handlers expose it over HTTP.
// Nothing in here touches the network.

pub mod engine;
pub mod error;
pub mod gestures;
pub mod handlers;
pub mod labels;
pub mod selection;
pub mod token_store;
pub mod undo;
pub mod workspace;
