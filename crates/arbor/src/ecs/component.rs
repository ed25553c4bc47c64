//! Type-erased component columns.
//!
//! Archetypes hold a dynamic set of component types, so a column cannot be a
//! `Vec<T>`. Each value is boxed as `dyn Any + Send + Sync` and recovered with
//! a checked downcast. No `unsafe` is involved; a failed downcast means the
//! column map was corrupted and is reported with a panic naming the type.

use std::any::{Any, TypeId};

pub(crate) type BoxedComponent = Box<dyn Any + Send + Sync>;

pub(crate) fn component_type_id<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}

/// One column of an archetype table. Row `i` belongs to the entity at row `i`
/// of the archetype's entity list.
pub(crate) struct ComponentColumn {
    rows: Vec<BoxedComponent>,
}

impl ComponentColumn {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[cfg(test)]
    pub fn push<T: 'static + Send + Sync>(&mut self, value: T) {
        self.rows.push(Box::new(value));
    }

    pub fn push_boxed(&mut self, value: BoxedComponent) {
        self.rows.push(value);
    }

    pub fn get<T: 'static>(&self, row: usize) -> &T {
        self.rows[row].downcast_ref().unwrap_or_else(|| {
            panic!(
                "column holds a different type than `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_mut<T: 'static>(&mut self, row: usize) -> &mut T {
        self.rows[row].downcast_mut().unwrap_or_else(|| {
            panic!(
                "column holds a different type than `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_any(&self, row: usize) -> &dyn Any {
        &*self.rows[row]
    }

    /// Overwrite the value at `row`, returning the previous one.
    pub fn replace(&mut self, row: usize, value: BoxedComponent) -> BoxedComponent {
        std::mem::replace(&mut self.rows[row], value)
    }

    /// Swap-remove `row` and hand the value back. Used both to drop a row and
    /// to move it into another archetype.
    pub fn take(&mut self, row: usize) -> BoxedComponent {
        self.rows.swap_remove(row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_get_and_mutate() {
        let mut col = ComponentColumn::new();
        col.push(1.5f32);
        col.push(2.5f32);
        *col.get_mut::<f32>(1) += 1.0;
        assert_eq!(*col.get::<f32>(0), 1.5);
        assert_eq!(*col.get::<f32>(1), 3.5);
    }

    #[test]
    fn take_swaps_last_row_into_hole() {
        let mut col = ComponentColumn::new();
        col.push(10u32);
        col.push(20u32);
        col.push(30u32);
        let taken = col.take(0);
        assert_eq!(*taken.downcast::<u32>().unwrap(), 10);
        assert_eq!(col.len(), 2);
        assert_eq!(*col.get::<u32>(0), 30);
    }

    #[test]
    fn replace_returns_previous_value() {
        let mut col = ComponentColumn::new();
        col.push(String::from("old"));
        let previous = col.replace(0, Box::new(String::from("new")));
        assert_eq!(*previous.downcast::<String>().unwrap(), "old");
        assert_eq!(col.get::<String>(0), "new");
    }

    #[test]
    #[should_panic(expected = "different type")]
    fn wrong_type_panics() {
        let mut col = ComponentColumn::new();
        col.push(1u8);
        col.get::<u64>(0);
    }
}
