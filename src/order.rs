use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::vec;

use crate::contract::{Enumerator, State};
use crate::source::Contiguous;

/// Sort direction of an [`OrderBy`] view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A contiguous buffer viewed in key order.
///
/// Building the view does nothing. Each iterator obtained from it captures `(item, key)` pairs in
/// one pass on its first pull, stable-sorts them, then yields the items. Equal keys keep their
/// source order in both directions; descending order only inverts the comparer.
///
/// # Example
///
/// ```rust
/// use lazy_linq::ContiguousExt;
///
/// let tasks = [("lint", 2), ("build", 1), ("test", 2), ("fetch", 1)];
/// let by_priority = (&tasks[..]).order_by(|task| task.1);
/// let names: Vec<_> = by_priority.iter().map(|task| task.0).collect();
/// assert_eq!(names, vec!["build", "fetch", "lint", "test"]);
/// ```
#[derive(Clone)]
pub struct OrderBy<C, F, Cmp> {
    buffer: C,
    key_of: F,
    compare: Cmp,
    direction: Direction,
}

impl<C, K, F, Cmp> OrderBy<C, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
    pub fn new(buffer: C, key_of: F, compare: Cmp, direction: Direction) -> Self {
        OrderBy {
            buffer,
            key_of,
            compare,
            direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The same view, sorted the other way
    pub fn reversed(self) -> Self {
        let direction = match self.direction {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        };
        OrderBy { direction, ..self }
    }

    /// A fresh iterator; the sort happens on its first pull
    pub fn iter(&self) -> Ordered<'_, C, K, F, Cmp> {
        Ordered {
            view: self,
            sorted: None,
            state: State::NotStarted,
        }
    }
}

impl<C: fmt::Debug, F, Cmp> fmt::Debug for OrderBy<C, F, Cmp> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OrderBy")
            .field("buffer", &self.buffer)
            .field("direction", &self.direction)
            .finish()
    }
}

impl<'v, C, K, F, Cmp> IntoIterator for &'v OrderBy<C, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
    type Item = C::Elem;
    type IntoIter = Ordered<'v, C, K, F, Cmp>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal of an [`OrderBy`] view
pub struct Ordered<'v, C: Contiguous, K, F, Cmp> {
    view: &'v OrderBy<C, F, Cmp>,
    sorted: Option<vec::IntoIter<(C::Elem, K)>>,
    state: State,
}

impl<'v, C, K, F, Cmp> Ordered<'v, C, K, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
    fn capture(&self) -> Vec<(C::Elem, K)> {
        let view = self.view;
        let mut pairs = Vec::with_capacity(view.buffer.len());
        let mut pos = 0;
        while let Some((item, next)) = view.buffer.step(pos) {
            let key = (view.key_of)(&item);
            pairs.push((item, key));
            pos = next;
        }
        // `sort_by` is a stable merge sort: ties keep source order
        match view.direction {
            Direction::Ascending => pairs.sort_by(|a, b| (view.compare)(&a.1, &b.1)),
            Direction::Descending => pairs.sort_by(|a, b| (view.compare)(&a.1, &b.1).reverse()),
        }
        trace!("order by: sorted {} pairs {:?}", pairs.len(), view.direction);
        pairs
    }
}

impl<'v, C, K, F, Cmp> Iterator for Ordered<'v, C, K, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
    type Item = C::Elem;

    fn next(&mut self) -> Option<C::Elem> {
        match self.state {
            State::NotStarted => {
                self.sorted = Some(self.capture().into_iter());
                self.state = State::Running;
            }
            State::Running => {}
            State::Exhausted | State::Disposed => return None,
        }
        let next = self.sorted.as_mut().and_then(|sorted| sorted.next());
        match next {
            Some((item, _)) => Some(item),
            None => {
                self.sorted = None;
                self.state = State::Exhausted;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.state, self.sorted.as_ref()) {
            (State::Running, Some(sorted)) => sorted.size_hint(),
            (State::NotStarted, _) => (0, Some(self.view.buffer.len())),
            _ => (0, Some(0)),
        }
    }
}

impl<'v, C, K, F, Cmp> FusedIterator for Ordered<'v, C, K, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
}

impl<'v, C, K, F, Cmp> Enumerator for Ordered<'v, C, K, F, Cmp>
where
    C: Contiguous,
    F: Fn(&C::Elem) -> K,
    Cmp: Fn(&K, &K) -> Ordering,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.sorted = None;
        self.state = State::Disposed;
    }
}
