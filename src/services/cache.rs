//! Minnescache per entitetstyp.
//!
//! Cachen är en kandidatmängd, aldrig facit: en miss leder alltid till
//! en läsning från lagret. `clear` släpper bara minnesindexet.

use std::collections::HashMap;

use crate::models::Entity;

#[derive(Debug, Clone)]
pub struct CollectionCache<T: Entity> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Entity> Default for CollectionCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> CollectionCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// Lägg till eller ersätt. Returnerar true om posten var ny.
    ///
    /// Två samtidiga missar kan båda fylla på med samma rader; dubbletter
    /// ersätter den tidigare kopian på samma plats.
    pub fn add(&mut self, entity: T) -> bool {
        match self.index.get(entity.key()) {
            Some(&i) => {
                self.items[i] = entity;
                false
            }
            None => {
                self.index.insert(entity.key().to_string(), self.items.len());
                self.items.push(entity);
                true
            }
        }
    }

    /// Lägg till flera, returnerar antal nya
    pub fn add_all(&mut self, entities: impl IntoIterator<Item = T>) -> usize {
        let mut added = 0;
        for entity in entities {
            if self.add(entity) {
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let i = self.index.remove(key)?;
        let removed = self.items.remove(i);
        self.reindex();
        Some(removed)
    }

    /// Behåll bara poster som uppfyller villkoret, returnerar de borttagna
    pub fn retain(&mut self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let (kept, removed): (Vec<T>, Vec<T>) =
            std::mem::take(&mut self.items).into_iter().partition(|e| keep(e));
        self.items = kept;
        self.reindex();
        removed
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kopior av matchande poster, i cacheordning
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.items.iter().filter(|e| pred(e)).cloned().collect()
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key().to_string(), i))
            .collect();
    }
}
