use std::iter::FusedIterator;
use std::mem;

use crate::contract::{Enumerator, State};
use crate::source::Contiguous;

/// One run of contiguous source elements that share a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<K, M> {
    pub key: K,
    pub members: M,
}

impl<K, M> Grouping<K, M> {
    pub fn key(&self) -> &K {
        &self.key
    }
    pub fn members(&self) -> &M {
        &self.members
    }
    pub fn into_members(self) -> M {
        self.members
    }
}

/// What run grouping needs from a source: pull the next undecided element, keep an element in the
/// pending run, and close the pending run.
pub trait RunSource {
    type Item;
    type Members;

    fn pull(&mut self) -> Option<Self::Item>;
    /// Add the element most recently pulled to the pending run
    fn keep(&mut self, item: Self::Item);
    /// Take the pending run, leaving an empty one behind
    fn close(&mut self) -> Self::Members;
}

/// Runs over a pull sequence are buffered into a `Vec`
#[derive(Debug, Clone)]
pub struct PullRuns<I: Iterator> {
    source: I,
    pending: Vec<I::Item>,
}

impl<I: Iterator> PullRuns<I> {
    pub fn new(source: I) -> Self {
        PullRuns {
            source,
            pending: Vec::new(),
        }
    }
}

impl<I: Iterator> RunSource for PullRuns<I> {
    type Item = I::Item;
    type Members = Vec<I::Item>;

    #[inline]
    fn pull(&mut self) -> Option<I::Item> {
        self.source.next()
    }
    #[inline]
    fn keep(&mut self, item: I::Item) {
        self.pending.push(item);
    }
    #[inline]
    fn close(&mut self) -> Vec<I::Item> {
        mem::replace(&mut self.pending, Vec::new())
    }
}

/// Runs over a contiguous source are sub-slices of it; nothing is copied
#[derive(Debug, Clone)]
pub struct SliceRuns<C> {
    buffer: C,
    start: usize,
    end: usize,
    cursor: usize,
}

impl<C: Contiguous> SliceRuns<C> {
    pub fn new(buffer: C) -> Self {
        SliceRuns {
            buffer,
            start: 0,
            end: 0,
            cursor: 0,
        }
    }
}

impl<C: Contiguous> RunSource for SliceRuns<C> {
    type Item = C::Elem;
    type Members = C;

    #[inline]
    fn pull(&mut self) -> Option<C::Elem> {
        let (elem, next) = self.buffer.step(self.cursor)?;
        self.cursor = next;
        Some(elem)
    }
    #[inline]
    fn keep(&mut self, _: C::Elem) {
        self.end = self.cursor;
    }
    #[inline]
    fn close(&mut self) -> C {
        let run = self.buffer.slice(self.start..self.end);
        self.start = self.end;
        run
    }
}

/// Groups *contiguous* elements with equal keys, one [`Grouping`] per `next`.
///
/// This is not a hash group-by: `[1, 1, 2, 1]` grouped by identity yields three groups, because
/// the two runs of `1` are not adjacent. The iterator always holds exactly one undecided element,
/// the one that tells whether the current run continues. Groups come out in source order.
#[derive(Debug, Clone)]
pub struct GroupRuns<S, K, F, E> {
    source: Option<S>,
    key_of: F,
    eq: E,
    current: Option<K>,
    state: State,
}

impl<S, K, F, E> GroupRuns<S, K, F, E>
where
    S: RunSource,
    F: FnMut(&S::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    pub fn new(source: S, key_of: F, eq: E) -> Self {
        GroupRuns {
            source: Some(source),
            key_of,
            eq,
            current: None,
            state: State::NotStarted,
        }
    }

    fn finish(&mut self) {
        trace!("group runs: source exhausted");
        self.source = None;
        self.current = None;
        self.state = State::Exhausted;
    }
}

impl<S, K, F, E> Iterator for GroupRuns<S, K, F, E>
where
    S: RunSource,
    F: FnMut(&S::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    type Item = Grouping<K, S::Members>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_finished() {
            return None;
        }
        if self.state == State::NotStarted {
            let first = self.source.as_mut().and_then(|source| source.pull());
            match first {
                Some(first) => {
                    self.current = Some((self.key_of)(&first));
                    if let Some(source) = self.source.as_mut() {
                        source.keep(first);
                    }
                    self.state = State::Running;
                }
                None => {
                    self.finish();
                    return None;
                }
            }
        }
        loop {
            let pulled = self.source.as_mut()?.pull();
            match pulled {
                Some(item) => {
                    let key = (self.key_of)(&item);
                    let same = match self.current {
                        Some(ref current) => (self.eq)(current, &key),
                        None => false,
                    };
                    let source = self.source.as_mut()?;
                    if same {
                        source.keep(item);
                        continue;
                    }
                    let members = source.close();
                    source.keep(item);
                    let key = self.current.replace(key)?;
                    return Some(Grouping { key, members });
                }
                None => {
                    let members = self.source.as_mut()?.close();
                    let key = self.current.take()?;
                    self.finish();
                    return Some(Grouping { key, members });
                }
            }
        }
    }
}

impl<S, K, F, E> FusedIterator for GroupRuns<S, K, F, E>
where
    S: RunSource,
    F: FnMut(&S::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
}

impl<S, K, F, E> Enumerator for GroupRuns<S, K, F, E>
where
    S: RunSource,
    F: FnMut(&S::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.source = None;
        self.current = None;
        self.state = State::Disposed;
    }
}

/// Yields the first element of every run: consecutive elements whose keys are equal to the
/// previous element's key are dropped.
#[derive(Debug, Clone)]
pub struct DistinctRuns<I, K, F, E> {
    source: Option<I>,
    key_of: F,
    eq: E,
    last: Option<K>,
    state: State,
}

impl<I, K, F, E> DistinctRuns<I, K, F, E>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    pub fn new(source: I, key_of: F, eq: E) -> Self {
        DistinctRuns {
            source: Some(source),
            key_of,
            eq,
            last: None,
            state: State::NotStarted,
        }
    }
}

impl<I, K, F, E> Iterator for DistinctRuns<I, K, F, E>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.state.is_finished() {
            return None;
        }
        let source = self.source.as_mut()?;
        self.state = State::Running;
        while let Some(item) = source.next() {
            let key = (self.key_of)(&item);
            let repeated = match self.last {
                Some(ref last) => (self.eq)(last, &key),
                None => false,
            };
            // the run continues under its first key
            if !repeated {
                self.last = Some(key);
                return Some(item);
            }
        }
        trace!("distinct runs: source exhausted");
        self.source = None;
        self.last = None;
        self.state = State::Exhausted;
        None
    }
}

impl<I, K, F, E> FusedIterator for DistinctRuns<I, K, F, E>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
}

impl<I, K, F, E> Enumerator for DistinctRuns<I, K, F, E>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    E: FnMut(&K, &K) -> bool,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.source = None;
        self.last = None;
        self.state = State::Disposed;
    }
}
