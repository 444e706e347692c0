use std::cmp::Ordering;
use std::iter::{Rev, Take};

use failure::Error;

use crate::filter::{Select, SelectBuffer, Where, WhereBuffer};
use crate::group::{DistinctRuns, GroupRuns, PullRuns, SliceRuns};
use crate::index::{check_count, BufferIndices, IndicesOf, LastIndices};
use crate::matcher::{Equals, Predicate};
use crate::order::{Direction, OrderBy};
use crate::pool::ScratchPool;
use crate::source::{Contiguous, Elements, SubSequence};
use crate::split::{ElementSegmenter, PullSegmenter, Split, WindowSegmenter};
use crate::SequenceError;

/// Natural key equality, used when no comparer is given
pub type KeyEq<K> = fn(&K, &K) -> bool;
/// Natural key ordering, used when no comparer is given
pub type KeyOrd<K> = fn(&K, &K) -> Ordering;
/// Identity key of a cloneable element
pub type Identity<T> = fn(&T) -> T;

/// Lazy operations over any pull sequence.
///
/// None of these pull anything when called; work happens as the returned iterator is pulled.
pub trait PullExt: Iterator + Sized {
    /// Keep the elements matching `predicate`
    fn where_by<P>(self, predicate: P) -> Where<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Where::new(self, predicate)
    }

    /// Project every element through `selector`
    fn select<B, F>(self, selector: F) -> Select<Self, F>
    where
        F: FnMut(Self::Item) -> B,
    {
        Select::new(self, selector)
    }

    /// Group contiguous runs of elements with equal keys
    fn group_runs<K, F>(self, key_of: F) -> GroupRuns<PullRuns<Self>, K, F, KeyEq<K>>
    where
        K: PartialEq,
        F: FnMut(&Self::Item) -> K,
    {
        GroupRuns::new(PullRuns::new(self), key_of, <K as PartialEq>::eq as KeyEq<K>)
    }

    /// Group contiguous runs, comparing keys with `eq`
    fn group_runs_by<K, F, E>(self, key_of: F, eq: E) -> GroupRuns<PullRuns<Self>, K, F, E>
    where
        F: FnMut(&Self::Item) -> K,
        E: FnMut(&K, &K) -> bool,
    {
        GroupRuns::new(PullRuns::new(self), key_of, eq)
    }

    /// Drop elements equal to the element before them
    fn distinct_runs(self) -> DistinctRuns<Self, Self::Item, Identity<Self::Item>, KeyEq<Self::Item>>
    where
        Self::Item: Clone + PartialEq,
    {
        DistinctRuns::new(
            self,
            <Self::Item as Clone>::clone as Identity<Self::Item>,
            <Self::Item as PartialEq>::eq as KeyEq<Self::Item>,
        )
    }

    /// Drop elements whose key equals the key of the element before them
    fn distinct_runs_by<K, F>(self, key_of: F) -> DistinctRuns<Self, K, F, KeyEq<K>>
    where
        K: PartialEq,
        F: FnMut(&Self::Item) -> K,
    {
        DistinctRuns::new(self, key_of, <K as PartialEq>::eq as KeyEq<K>)
    }

    /// Split into the segments between elements equal to `separator`
    fn split_on(self, separator: Self::Item) -> Split<PullSegmenter<Self, Equals<Self::Item>>>
    where
        Self::Item: PartialEq,
    {
        Split::new(PullSegmenter::new(self, Equals(separator)))
    }

    /// Split into the segments between elements matching `predicate`
    fn split_when<P>(self, predicate: P) -> Split<PullSegmenter<Self, Predicate<P>>>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Split::new(PullSegmenter::new(self, Predicate(predicate)))
    }

    /// Indices of the elements equal to `value`
    fn indices_of(self, value: Self::Item) -> IndicesOf<Self, Equals<Self::Item>>
    where
        Self::Item: PartialEq,
    {
        IndicesOf::new(self, Equals(value))
    }

    /// Indices of the elements matching `predicate`
    fn indices_where<P>(self, predicate: P) -> IndicesOf<Self, Predicate<P>>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        IndicesOf::new(self, Predicate(predicate))
    }

    /// The first `count` indices of `value`; the scan stops at the `count`th match
    fn first_n_indices_of(
        self,
        value: Self::Item,
        count: usize,
    ) -> Result<Take<IndicesOf<Self, Equals<Self::Item>>>, Error>
    where
        Self::Item: PartialEq,
    {
        let count = check_count(count)?;
        Ok(self.indices_of(value).take(count))
    }

    /// The last `count` indices of `value`, highest first. Reads the whole source before yielding.
    fn last_n_indices_of(
        self,
        value: Self::Item,
        count: usize,
    ) -> Result<LastIndices<Self, Equals<Self::Item>>, Error>
    where
        Self::Item: PartialEq,
    {
        LastIndices::new(self, Equals(value), count)
    }
}

impl<I: Iterator> PullExt for I {}

/// Lazy operations over contiguous sources: slices, [`TextSegment`](crate::TextSegment)s and
/// [`Transducer`](crate::Transducer)s.
///
/// Segments and groups are zero-copy sub-slices of the source; indices count elements, never bytes.
pub trait ContiguousExt: Contiguous {
    /// A plain walk over the elements
    fn elements(self) -> Elements<Self> {
        Elements::new(self)
    }

    /// Keep the elements matching `predicate`, staging matches in the global scratch pool.
    /// Fails with [`SequenceError::EmptySource`] on an empty buffer, and with
    /// [`SequenceError::Overflow`] on one too long to stage.
    fn where_by<P>(self, predicate: P) -> Result<WhereBuffer<'static, Self, P>, Error>
    where
        P: FnMut(&Self::Elem) -> bool,
    {
        WhereBuffer::new(self, predicate, ScratchPool::global())
    }

    /// [`where_by`](ContiguousExt::where_by) with an explicit scratch pool
    fn where_in<'p, P>(self, predicate: P, pool: &'p ScratchPool) -> Result<WhereBuffer<'p, Self, P>, Error>
    where
        P: FnMut(&Self::Elem) -> bool,
    {
        WhereBuffer::new(self, predicate, pool)
    }

    fn select<B, F>(self, selector: F) -> SelectBuffer<Self, F>
    where
        F: FnMut(Self::Elem) -> B,
    {
        SelectBuffer::new(self, selector)
    }

    fn group_runs<K, F>(self, key_of: F) -> GroupRuns<SliceRuns<Self>, K, F, KeyEq<K>>
    where
        K: PartialEq,
        F: FnMut(&Self::Elem) -> K,
    {
        GroupRuns::new(SliceRuns::new(self), key_of, <K as PartialEq>::eq as KeyEq<K>)
    }

    fn group_runs_by<K, F, E>(self, key_of: F, eq: E) -> GroupRuns<SliceRuns<Self>, K, F, E>
    where
        F: FnMut(&Self::Elem) -> K,
        E: FnMut(&K, &K) -> bool,
    {
        GroupRuns::new(SliceRuns::new(self), key_of, eq)
    }

    /// Drop elements equal to the element before them.
    /// Fails with [`SequenceError::EmptySource`] on an empty buffer.
    fn distinct_runs(
        self,
    ) -> Result<DistinctRuns<Elements<Self>, Self::Elem, Identity<Self::Elem>, KeyEq<Self::Elem>>, Error>
    where
        Self::Elem: Clone + PartialEq,
    {
        if self.is_empty() {
            return Err(SequenceError::EmptySource.into());
        }
        Ok(DistinctRuns::new(
            Elements::new(self),
            <Self::Elem as Clone>::clone as Identity<Self::Elem>,
            <Self::Elem as PartialEq>::eq as KeyEq<Self::Elem>,
        ))
    }

    fn split_on(self, separator: Self::Elem) -> Split<ElementSegmenter<Self, Equals<Self::Elem>>>
    where
        Self::Elem: PartialEq,
    {
        Split::new(ElementSegmenter::new(self, Equals(separator)))
    }

    fn split_when<P>(self, predicate: P) -> Split<ElementSegmenter<Self, Predicate<P>>>
    where
        P: FnMut(&Self::Elem) -> bool,
    {
        Split::new(ElementSegmenter::new(self, Predicate(predicate)))
    }

    /// Split on every occurrence of the sub-sequence `separator`.
    /// Fails with [`SequenceError::InvalidArgument`] if `separator` is empty.
    fn split_seq(self, separator: Self) -> Result<Split<WindowSegmenter<Self>>, Error>
    where
        Self: SubSequence,
        Self::Elem: PartialEq,
    {
        Ok(Split::new(WindowSegmenter::new(self, separator)?))
    }

    fn indices_of(self, value: Self::Elem) -> BufferIndices<Self, Equals<Self::Elem>>
    where
        Self::Elem: PartialEq,
    {
        BufferIndices::new(self, Equals(value))
    }

    fn indices_where<P>(self, predicate: P) -> BufferIndices<Self, Predicate<P>>
    where
        P: FnMut(&Self::Elem) -> bool,
    {
        BufferIndices::new(self, Predicate(predicate))
    }

    fn first_n_indices_of(
        self,
        value: Self::Elem,
        count: usize,
    ) -> Result<Take<BufferIndices<Self, Equals<Self::Elem>>>, Error>
    where
        Self::Elem: PartialEq,
    {
        let count = check_count(count)?;
        Ok(self.indices_of(value).take(count))
    }

    /// The last `count` indices of `value`, highest first; scans backwards, lazily
    fn last_n_indices_of(
        self,
        value: Self::Elem,
        count: usize,
    ) -> Result<Take<Rev<BufferIndices<Self, Equals<Self::Elem>>>>, Error>
    where
        Self::Elem: PartialEq,
    {
        let count = check_count(count)?;
        Ok(self.indices_of(value).rev().take(count))
    }

    fn order_by<K, F>(self, key_of: F) -> OrderBy<Self, F, KeyOrd<K>>
    where
        K: Ord,
        F: Fn(&Self::Elem) -> K,
    {
        OrderBy::new(self, key_of, <K as Ord>::cmp as KeyOrd<K>, Direction::Ascending)
    }

    fn order_by_descending<K, F>(self, key_of: F) -> OrderBy<Self, F, KeyOrd<K>>
    where
        K: Ord,
        F: Fn(&Self::Elem) -> K,
    {
        OrderBy::new(self, key_of, <K as Ord>::cmp as KeyOrd<K>, Direction::Descending)
    }

    fn order_by_with<K, F, Cmp>(self, key_of: F, compare: Cmp, direction: Direction) -> OrderBy<Self, F, Cmp>
    where
        F: Fn(&Self::Elem) -> K,
        Cmp: Fn(&K, &K) -> Ordering,
    {
        OrderBy::new(self, key_of, compare, direction)
    }
}

impl<C: Contiguous> ContiguousExt for C {}
