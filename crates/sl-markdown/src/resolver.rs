use std::collections::BTreeMap;
use std::fmt;

use sl_core::slugify;

use crate::diagnostics::{Diagnostic, Origin};

/// Outcome of looking a written name up in a [`NameIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup<T> {
    Found(T),
    Ambiguous(Vec<T>),
    Missing,
}

/// Cross-scene name index for one kind of entity.
///
/// References resolve by exact id first, then by the slug of the text,
/// then by case-insensitive display name or alias.
#[derive(Debug)]
pub(crate) struct NameIndex<T> {
    ids: BTreeMap<String, T>,
    names: BTreeMap<String, Vec<T>>,
}

impl<T> Default for NameIndex<T> {
    fn default() -> Self {
        Self {
            ids: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }
}

impl<T: Clone + PartialEq + fmt::Display> NameIndex<T> {
    /// Register an entity under its id.
    pub fn insert_id(&mut self, id: &str, value: T) {
        self.ids.insert(id.to_string(), value);
    }

    /// Register a display name or alias.
    pub fn insert_name(&mut self, name: &str, value: T) {
        let entry = self.names.entry(name.trim().to_lowercase()).or_default();
        if !entry.contains(&value) {
            entry.push(value);
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn find(&self, text: &str) -> Lookup<T> {
        let text = text.trim();
        if let Some(found) = self.ids.get(text).or_else(|| self.ids.get(&slugify(text))) {
            return Lookup::Found(found.clone());
        }
        match self.names.get(&text.to_lowercase()).map(Vec::as_slice) {
            Some([only]) => Lookup::Found(only.clone()),
            Some(many) if !many.is_empty() => Lookup::Ambiguous(many.to_vec()),
            _ => Lookup::Missing,
        }
    }

    /// Resolve a reference, pushing a diagnostic when it does not resolve.
    pub fn lookup(
        &self,
        kind: &str,
        text: &str,
        origin: &Origin,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<T> {
        match self.find(text) {
            Lookup::Found(found) => Some(found),
            Lookup::Ambiguous(candidates) => {
                let list: Vec<String> = candidates.iter().map(ToString::to_string).collect();
                diagnostics.push(
                    Diagnostic::error(
                        origin.clone(),
                        format!("ambiguous {kind} \"{text}\": could be {}", list.join(", ")),
                    )
                    .with_label("use the id to pick one"),
                );
                None
            }
            Lookup::Missing => {
                diagnostics.push(
                    Diagnostic::error(origin.clone(), format!("unknown {kind} \"{text}\""))
                        .with_label(format!("no {kind} by this name or id")),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sl_core::ItemId;

    use super::*;

    fn index() -> NameIndex<ItemId> {
        let mut index = NameIndex::default();
        for (id, name) in [("brass_key", "Brass Key"), ("door", "Door"), ("door_2", "Door")] {
            index.insert_id(id, ItemId::new(id));
            index.insert_name(name, ItemId::new(id));
        }
        index.insert_name("key", ItemId::new("brass_key"));
        index
    }

    #[test]
    fn resolves_by_id_slug_name_and_alias() {
        let index = index();
        let key = Lookup::Found(ItemId::new("brass_key"));
        assert_eq!(index.find("brass_key"), key);
        assert_eq!(index.find("Brass Key"), key);
        assert_eq!(index.find("BRASS-KEY"), key);
        assert_eq!(index.find("key"), key);
        assert_eq!(index.find("door"), Lookup::Found(ItemId::new("door")));
    }

    #[test]
    fn shared_names_are_ambiguous() {
        let mut index = index();
        index.insert_name("Portal", ItemId::new("door"));
        index.insert_name("portal", ItemId::new("door_2"));
        assert_eq!(
            index.find("Portal"),
            Lookup::Ambiguous(vec![ItemId::new("door"), ItemId::new("door_2")])
        );
    }

    #[test]
    fn lookup_reports_missing() {
        let mut diagnostics = Vec::new();
        let found = index().lookup("item", "lamp", &Origin::world(), &mut diagnostics);
        assert!(found.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unknown item \"lamp\""));
    }
}
