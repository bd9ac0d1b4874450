//! Token Store: the ordered token sequence of one document.
//!
//! The store is the only place that assigns token identity. Ids are always
//! exactly `0..len`; every structural edit ends with a renumbering pass and
//! hands back the old→new id map so callers can reconcile anything that
//! refers to tokens by id.

use std::collections::{HashMap, HashSet};

use crate::annotation::error::{LabelingError, LabelingResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: usize,
    pub text: String,
    /// Empty string means unlabeled.
    pub label: String,
    /// Mirrors `id` after renumbering. Deleted tokens keep the value they
    /// held at deletion time so undo can put them back.
    pub position: usize,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            label: String::new(),
            position: 0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }
}

/// Maps the id a surviving token had before a structural edit to its id after.
pub type IdMap = HashMap<usize, usize>;

/// Result of `TokenStore::delete_tokens`.
#[derive(Debug, Default)]
pub struct Removal {
    /// Removed tokens with their pre-deletion id/position, in document order.
    pub removed: Vec<Token>,
    pub remap: IdMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut store = Self::default();
        store.load(tokens);
        store
    }

    /// Replaces the whole sequence. Incoming ids are ignored; tokens are
    /// numbered by their order.
    pub fn load(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.renumber();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens.iter().map(|t| t.id)
    }

    pub fn contains(&self, id: usize) -> bool {
        id < self.tokens.len()
    }

    pub fn get(&self, id: usize) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn set_label(&mut self, id: usize, label: &str) -> LabelingResult<()> {
        let token = self
            .tokens
            .get_mut(id)
            .ok_or_else(|| LabelingError::NotFound(format!("Token {id}")))?;
        token.label = label.to_string();
        Ok(())
    }

    /// Removes every token whose id is in `ids` and renumbers the survivors.
    /// Ids that match nothing are ignored; if nothing matches this is a no-op.
    pub fn delete_tokens(&mut self, ids: &HashSet<usize>) -> Removal {
        if ids.is_empty() || !self.tokens.iter().any(|t| ids.contains(&t.id)) {
            return Removal::default();
        }

        let (removed, kept): (Vec<Token>, Vec<Token>) = std::mem::take(&mut self.tokens)
            .into_iter()
            .partition(|t| ids.contains(&t.id));

        self.tokens = kept;
        let remap = self.renumber();
        Removal { removed, remap }
    }

    /// Merges previously removed tokens back into the sequence.
    ///
    /// Each restored token reclaims the position it held when it was
    /// removed; survivors fill the remaining slots in their current order.
    /// When two restored tokens claim the same position the lower recorded
    /// id goes first. A position past the end appends.
    pub fn restore_tokens(&mut self, records: Vec<Token>) -> IdMap {
        if records.is_empty() {
            return IdMap::new();
        }

        let mut restored = records;
        restored.sort_by_key(|t| (t.position, t.id));

        // Restored ids collide with survivor ids, so survivors are tagged
        // with their pre-restore id and restored tokens with `None`.
        let mut merged: Vec<(Option<usize>, Token)> = std::mem::take(&mut self.tokens)
            .into_iter()
            .map(|t| (Some(t.id), t))
            .collect();
        for token in restored {
            let at = token.position.min(merged.len());
            merged.insert(at, (None, token));
        }

        let mut remap = IdMap::with_capacity(merged.len());
        self.tokens = merged
            .into_iter()
            .enumerate()
            .map(|(index, (survivor, mut token))| {
                if let Some(old) = survivor {
                    remap.insert(old, index);
                }
                token.id = index;
                token.position = index;
                token
            })
            .collect();
        remap
    }

    /// Sets every token's label to the empty string.
    pub fn clear_labels(&mut self) {
        for token in &mut self.tokens {
            token.label.clear();
        }
    }

    /// Clears `label` from every token carrying it. Returns how many changed.
    pub fn clear_label_value(&mut self, label: &str) -> usize {
        let mut cleared = 0;
        for token in self.tokens.iter_mut().filter(|t| t.label == label) {
            token.label.clear();
            cleared += 1;
        }
        cleared
    }

    fn renumber(&mut self) -> IdMap {
        let mut remap = IdMap::with_capacity(self.tokens.len());
        for (index, token) in self.tokens.iter_mut().enumerate() {
            remap.insert(token.id, index);
            token.id = index;
            token.position = index;
        }
        remap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(words: &[&str]) -> TokenStore {
        TokenStore::new(words.iter().map(|w| Token::new(*w)).collect())
    }

    fn texts(store: &TokenStore) -> Vec<&str> {
        store.iter().map(|t| t.text.as_str()).collect()
    }

    fn assert_dense(store: &TokenStore) {
        for (index, token) in store.iter().enumerate() {
            assert_eq!(token.id, index);
            assert_eq!(token.position, index);
        }
    }

    fn ids(list: &[usize]) -> HashSet<usize> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_load_ignores_incoming_ids() {
        let mut tokens = vec![Token::new("a"), Token::new("b")];
        tokens[0].id = 7;
        tokens[1].id = 7;
        let store = TokenStore::new(tokens);
        assert_dense(&store);
    }

    #[test]
    fn test_delete_renumbers_survivors_in_order() {
        let mut store = store(&["Senior", "Engineer", "Remote"]);
        let removal = store.delete_tokens(&ids(&[1]));

        assert_eq!(texts(&store), vec!["Senior", "Remote"]);
        assert_dense(&store);
        assert_eq!(removal.removed.len(), 1);
        assert_eq!(removal.removed[0].id, 1);
        assert_eq!(removal.removed[0].position, 1);
        assert_eq!(removal.remap.get(&2), Some(&1));
        assert_eq!(removal.remap.get(&0), Some(&0));
        assert!(!removal.remap.contains_key(&1));
    }

    #[test]
    fn test_delete_empty_set_is_noop() {
        let mut store = store(&["a", "b"]);
        let removal = store.delete_tokens(&HashSet::new());
        assert!(removal.removed.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_unknown_ids_is_noop() {
        let mut store = store(&["a", "b"]);
        let removal = store.delete_tokens(&ids(&[5, 9]));
        assert!(removal.removed.is_empty());
        assert_eq!(texts(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_delete_all_leaves_empty_store() {
        let mut store = store(&["a", "b", "c"]);
        let removal = store.delete_tokens(&ids(&[0, 1, 2]));
        assert!(store.is_empty());
        assert_eq!(removal.removed.len(), 3);
        assert_eq!(store.ids().count(), 0);
    }

    #[test]
    fn test_restore_is_inverse_of_delete() {
        let original = store(&["Senior", "Engineer", "Remote"]);
        let mut edited = original.clone();
        let removal = edited.delete_tokens(&ids(&[1]));
        edited.restore_tokens(removal.removed);
        assert_eq!(edited, original);
    }

    #[test]
    fn test_restore_interleaves_non_contiguous_tokens() {
        let original = store(&["a", "b", "c", "d", "e", "f"]);
        let mut edited = original.clone();
        let removal = edited.delete_tokens(&ids(&[0, 2, 5]));
        assert_eq!(texts(&edited), vec!["b", "d", "e"]);

        let remap = edited.restore_tokens(removal.removed);
        assert_eq!(edited, original);
        // survivors b, d, e were 0, 1, 2 and go back to 1, 3, 4
        assert_eq!(remap.get(&0), Some(&1));
        assert_eq!(remap.get(&1), Some(&3));
        assert_eq!(remap.get(&2), Some(&4));
        assert_eq!(remap.len(), 3);
    }

    #[test]
    fn test_stacked_deletes_restore_in_reverse() {
        let original = store(&["a", "b", "c", "d", "e"]);
        let mut edited = original.clone();
        let first = edited.delete_tokens(&ids(&[1, 3]));
        assert_dense(&edited);
        let second = edited.delete_tokens(&ids(&[0]));
        assert_eq!(texts(&edited), vec!["c", "e"]);
        assert_dense(&edited);

        edited.restore_tokens(second.removed);
        assert_eq!(texts(&edited), vec!["a", "c", "e"]);
        assert_dense(&edited);
        edited.restore_tokens(first.removed);
        assert_eq!(edited, original);
    }

    #[test]
    fn test_restore_keeps_labels() {
        let mut store = store(&["Senior", "Engineer"]);
        store.set_label(1, "Title").unwrap();
        let removal = store.delete_tokens(&ids(&[1]));
        store.restore_tokens(removal.removed);
        assert_eq!(store.get(1).unwrap().label, "Title");
    }

    #[test]
    fn test_restore_past_end_appends() {
        let mut store = store(&["a"]);
        let mut stray = Token::new("z");
        stray.position = 10;
        store.restore_tokens(vec![stray]);
        assert_eq!(texts(&store), vec!["a", "z"]);
        assert_dense(&store);
    }

    #[test]
    fn test_set_label_stale_id_is_not_found() {
        let mut store = store(&["a"]);
        let err = store.set_label(3, "Title").unwrap_err();
        assert!(matches!(err, LabelingError::NotFound(_)));
    }

    #[test]
    fn test_clear_labels() {
        let mut store = TokenStore::new(vec![
            Token::new("a").with_label("Title"),
            Token::new("b").with_label("Skill"),
        ]);
        store.clear_labels();
        assert!(store.iter().all(|t| !t.is_labeled()));
    }

    #[test]
    fn test_clear_label_value_only_touches_matching_tokens() {
        let mut store = TokenStore::new(vec![
            Token::new("a").with_label("Title"),
            Token::new("b").with_label("Skill"),
            Token::new("c").with_label("Title"),
        ]);
        assert_eq!(store.clear_label_value("Title"), 2);
        assert_eq!(store.get(1).unwrap().label, "Skill");
        assert!(!store.get(0).unwrap().is_labeled());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_tokens() -> impl Strategy<Value = Vec<Token>> {
        prop::collection::vec(("[a-z]{1,6}", prop::option::of("[A-Z][a-z]{0,4}")), 1..30).prop_map(
            |words| {
                words
                    .into_iter()
                    .map(|(text, label)| match label {
                        Some(label) => Token::new(text).with_label(label),
                        None => Token::new(text),
                    })
                    .collect()
            },
        )
    }

    fn contents(store: &TokenStore) -> Vec<(String, String)> {
        store.iter().map(|t| (t.text.clone(), t.label.clone())).collect()
    }

    fn prop_assert_dense(store: &TokenStore) -> Result<(), TestCaseError> {
        for (index, token) in store.iter().enumerate() {
            prop_assert_eq!(token.id, index);
            prop_assert_eq!(token.position, index);
        }
        Ok(())
    }

    proptest! {
        /// Ids stay exactly `0..len` through any interleaving of deletes and
        /// restores, and unwinding every restore gives back the original.
        #[test]
        fn ids_stay_dense_through_delete_and_restore(
            tokens in arb_tokens(),
            steps in prop::collection::vec(
                (any::<bool>(), prop::collection::hash_set(0usize..30, 0..6)),
                0..20,
            ),
        ) {
            let mut store = TokenStore::new(tokens);
            let original = contents(&store);
            let mut history: Vec<Vec<Token>> = Vec::new();

            for (delete, ids) in steps {
                if delete {
                    let removal = store.delete_tokens(&ids);
                    if !removal.removed.is_empty() {
                        history.push(removal.removed);
                    }
                } else if let Some(removed) = history.pop() {
                    store.restore_tokens(removed);
                }
                prop_assert_dense(&store)?;
            }

            while let Some(removed) = history.pop() {
                store.restore_tokens(removed);
                prop_assert_dense(&store)?;
            }
            prop_assert_eq!(contents(&store), original);
        }

        /// Restoring a deletion of any non-empty set of existing ids gives
        /// back the exact prior sequence, and every survivor maps to its old slot.
        #[test]
        fn restore_undoes_delete(
            tokens in arb_tokens(),
            picks in prop::collection::hash_set(0usize..30, 1..10),
        ) {
            let mut store = TokenStore::new(tokens);
            let ids: HashSet<usize> = picks.into_iter().filter(|id| store.contains(*id)).collect();
            prop_assume!(!ids.is_empty());
            let original = contents(&store);

            let removal = store.delete_tokens(&ids);
            prop_assert_eq!(removal.removed.len(), ids.len());
            prop_assert_eq!(store.len(), original.len() - ids.len());

            let remap = store.restore_tokens(removal.removed);
            prop_assert_eq!(contents(&store), original);
            prop_assert_dense(&store)?;
            for (before, after) in removal.remap {
                prop_assert_eq!(remap.get(&after).copied(), Some(before));
            }
        }
    }
}
