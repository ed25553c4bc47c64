//! Archetype tables: every entity with exactly the same component set shares
//! one table, one [`ComponentColumn`] per type plus a parallel entity list.
//!
//! ```text
//! key: [Transform, Hierarchy]
//!   Transform: [t0, t1, t2]
//!   Hierarchy: [h0, h1, h2]
//!   entities:  [e0, e1, e2]
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{BoxedComponent, ComponentColumn};
use super::entity::Entity;

/// Sorted, deduplicated type list identifying an archetype.
pub(crate) type ArchetypeKey = Vec<TypeId>;

pub(crate) fn archetype_key(mut type_ids: Vec<TypeId>) -> ArchetypeKey {
    type_ids.sort();
    type_ids.dedup();
    type_ids
}

pub(crate) struct Archetype {
    pub columns: HashMap<TypeId, ComponentColumn>,
    pub entities: Vec<Entity>,
}

impl Archetype {
    /// Empty table with one column per type in `key`.
    pub fn for_key(key: &ArchetypeKey) -> Self {
        Self {
            columns: key.iter().map(|&t| (t, ComponentColumn::new())).collect(),
            entities: Vec::new(),
        }
    }

    pub fn has_component(&self, type_id: &TypeId) -> bool {
        self.columns.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Remove `row` from every column and return its values keyed by type.
    /// The last row is swapped into the hole; the moved entity (if any) is
    /// returned so the caller can fix its location.
    pub fn take_row(&mut self, row: usize) -> (HashMap<TypeId, BoxedComponent>, Option<Entity>) {
        let values = self
            .columns
            .iter_mut()
            .map(|(&t, col)| (t, col.take(row)))
            .collect();
        self.entities.swap_remove(row);
        let moved = self.entities.get(row).copied();
        (values, moved)
    }

    /// Append an entity with one value per column. Returns the new row.
    ///
    /// # Panics
    ///
    /// Panics if `values` is missing a column type, which indicates an
    /// archetype bookkeeping bug.
    pub fn push_row(&mut self, entity: Entity, mut values: HashMap<TypeId, BoxedComponent>) -> usize {
        for (t, col) in self.columns.iter_mut() {
            debug_assert_eq!(col.len(), self.entities.len());
            let value = values
                .remove(t)
                .unwrap_or_else(|| panic!("archetype row is missing a value for {t:?}"));
            col.push_boxed(value);
        }
        self.entities.push(entity);
        self.entities.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_order_and_duplicates() {
        let a = TypeId::of::<u32>();
        let b = TypeId::of::<f32>();
        assert_eq!(archetype_key(vec![a, b, a]), archetype_key(vec![b, a]));
    }

    #[test]
    fn take_row_reports_moved_entity() {
        let key = archetype_key(vec![TypeId::of::<u32>()]);
        let mut arch = Archetype::for_key(&key);
        let e0 = Entity { index: 0, generation: 0 };
        let e1 = Entity { index: 1, generation: 0 };
        for (e, v) in [(e0, 1u32), (e1, 2u32)] {
            let mut values: HashMap<TypeId, BoxedComponent> = HashMap::new();
            values.insert(TypeId::of::<u32>(), Box::new(v));
            arch.push_row(e, values);
        }

        let (values, moved) = arch.take_row(0);
        assert_eq!(moved, Some(e1));
        assert_eq!(arch.len(), 1);
        let taken = values.into_values().next().unwrap();
        assert_eq!(*taken.downcast::<u32>().unwrap(), 1);
        assert_eq!(*arch.columns[&TypeId::of::<u32>()].get::<u32>(0), 2);
    }
}
