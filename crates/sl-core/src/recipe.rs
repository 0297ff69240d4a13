use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// One product a recipe can yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeResult {
    /// The produced item.
    pub item: ItemId,
    /// Text shown when the item is produced.
    pub description: Option<String>,
}

/// An unordered ingredient pair and everything it can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Ingredients in sorted order.
    pub ingredients: (ItemId, ItemId),
    /// Candidate results. More than one makes the recipe ambiguous.
    pub results: Vec<RecipeResult>,
}

/// All combination recipes in a world, keyed by sorted ingredient pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    /// Create an empty recipe book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for an ingredient pair.
    pub fn key(a: &ItemId, b: &ItemId) -> (ItemId, ItemId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Register a result for an ingredient pair. A result already listed for
    /// the pair is ignored. Returns `true` if the result was added.
    pub fn add(&mut self, a: &ItemId, b: &ItemId, result: RecipeResult) -> bool {
        let key = Self::key(a, b);
        match self.recipes.iter_mut().find(|r| r.ingredients == key) {
            Some(recipe) => {
                if recipe.results.iter().any(|r| r.item == result.item) {
                    return false;
                }
                recipe.results.push(result);
            }
            None => self.recipes.push(Recipe {
                ingredients: key,
                results: vec![result],
            }),
        }
        true
    }

    /// Every result the pair can produce, in either order.
    pub fn lookup(&self, a: &ItemId, b: &ItemId) -> &[RecipeResult] {
        let key = Self::key(a, b);
        self.recipes
            .iter()
            .find(|r| r.ingredients == key)
            .map(|r| r.results.as_slice())
            .unwrap_or_default()
    }

    /// All recipes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Number of ingredient pairs with at least one result.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether no recipes are registered.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    fn ingredient() -> impl Strategy<Value = ItemId> {
        select(vec!["rag", "alcohol", "wire", "pin", "key", "lamp"]).prop_map(ItemId::from)
    }

    proptest! {
        #[test]
        fn lookup_ignores_argument_order(
            recipes in prop::collection::vec((ingredient(), ingredient(), ingredient()), 0..12),
            a in ingredient(),
            b in ingredient(),
        ) {
            let mut book = RecipeBook::new();
            for (first, second, made) in &recipes {
                book.add(first, second, RecipeResult { item: made.clone(), description: None });
            }
            prop_assert_eq!(book.lookup(&a, &b), book.lookup(&b, &a));
            for (first, second, made) in &recipes {
                prop_assert!(book.lookup(second, first).iter().any(|r| &r.item == made));
            }
        }
    }
}
