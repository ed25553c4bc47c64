//! Closure-based queries over archetype tables.
//!
//! `world.query::<(&Transform, &mut Camera)>(|entity, (t, cam)| ...)` visits
//! every entity whose archetype holds all requested types. Each requested
//! column is taken out of its archetype while the archetype is visited, so
//! the closure gets disjoint borrows with no `unsafe`, then put back.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::ComponentColumn;

#[doc(hidden)]
pub type Columns = HashMap<TypeId, ComponentColumn>;

/// A column taken out of an archetype for the length of one visit.
#[doc(hidden)]
pub struct Lifted {
    type_id: TypeId,
    column: ComponentColumn,
}

impl Lifted {
    fn take<T: 'static>(columns: &mut Columns) -> Self {
        let type_id = TypeId::of::<T>();
        match columns.remove(&type_id) {
            Some(column) => Self { type_id, column },
            None => panic!(
                "`{}` requested twice in one query or missing from the archetype",
                std::any::type_name::<T>()
            ),
        }
    }

    fn put_back(self, columns: &mut Columns) {
        columns.insert(self.type_id, self.column);
    }
}

/// What a query can ask for per entity: `&T`, `&mut T`, or a tuple of those.
pub trait QueryParam {
    type Item<'w>;
    #[doc(hidden)]
    type Lifted;

    /// Component types an archetype must contain to be visited.
    fn required() -> Vec<TypeId>;
    #[doc(hidden)]
    fn lift(columns: &mut Columns) -> Self::Lifted;
    #[doc(hidden)]
    fn put_back(lifted: Self::Lifted, columns: &mut Columns);
    #[doc(hidden)]
    fn row(lifted: &mut Self::Lifted, row: usize) -> Self::Item<'_>;
}

impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Lifted = Lifted;

    fn required() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn lift(columns: &mut Columns) -> Lifted {
        Lifted::take::<T>(columns)
    }

    fn put_back(lifted: Lifted, columns: &mut Columns) {
        lifted.put_back(columns);
    }

    fn row(lifted: &mut Lifted, row: usize) -> &T {
        lifted.column.get::<T>(row)
    }
}

impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Lifted = Lifted;

    fn required() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn lift(columns: &mut Columns) -> Lifted {
        Lifted::take::<T>(columns)
    }

    fn put_back(lifted: Lifted, columns: &mut Columns) {
        lifted.put_back(columns);
    }

    fn row(lifted: &mut Lifted, row: usize) -> &mut T {
        lifted.column.get_mut::<T>(row)
    }
}

macro_rules! tuple_query {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Lifted = ($($P::Lifted,)+);

            fn required() -> Vec<TypeId> {
                [$($P::required()),+].concat()
            }

            fn lift(columns: &mut Columns) -> Self::Lifted {
                ($($P::lift(columns),)+)
            }

            #[allow(non_snake_case)]
            fn put_back(lifted: Self::Lifted, columns: &mut Columns) {
                let ($($P,)+) = lifted;
                $($P::put_back($P, columns);)+
            }

            #[allow(non_snake_case)]
            fn row(lifted: &mut Self::Lifted, row: usize) -> Self::Item<'_> {
                let ($($P,)+) = lifted;
                ($($P::row($P, row),)+)
            }
        }
    };
}

tuple_query!(A);
tuple_query!(A, B);
tuple_query!(A, B, C);
tuple_query!(A, B, C, D);
tuple_query!(A, B, C, D, E);
tuple_query!(A, B, C, D, E, F);
