use std::iter::FusedIterator;
use std::mem;

use failure::Error;

use crate::contract::{Enumerator, State};
use crate::pool::ScratchPool;
use crate::source::Contiguous;
use crate::SequenceError;

/// Scratch capacity reserved up front by a buffer Where; the scratch grows past it as needed
const SCRATCH_RESERVE: usize = 1024;

/// Lazily keeps the elements of a pull sequence that satisfy a predicate.
///
/// Each `next` loops over the source until it finds a match or the source runs dry.
#[derive(Debug, Clone)]
pub struct Where<I, P> {
    source: Option<I>,
    predicate: P,
    state: State,
}

impl<I, P> Where<I, P> {
    pub fn new(source: I, predicate: P) -> Self {
        Where {
            source: Some(source),
            predicate,
            state: State::NotStarted,
        }
    }
}

impl<I, P> Iterator for Where<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.state.is_finished() {
            return None;
        }
        let source = self.source.as_mut()?;
        self.state = State::Running;
        while let Some(item) = source.next() {
            if (self.predicate)(&item) {
                return Some(item);
            }
        }
        trace!("where: source exhausted");
        self.source = None;
        self.state = State::Exhausted;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.source {
            Some(ref source) => (0, source.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl<I, P> FusedIterator for Where<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
}

impl<I, P> Enumerator for Where<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.source = None;
        self.state = State::Disposed;
    }
}

/// Lazily projects every element of a pull sequence; exactly one pull per `next`.
#[derive(Debug, Clone)]
pub struct Select<I, F> {
    source: Option<I>,
    selector: F,
    state: State,
}

impl<I, F> Select<I, F> {
    pub fn new(source: I, selector: F) -> Self {
        Select {
            source: Some(source),
            selector,
            state: State::NotStarted,
        }
    }
}

impl<B, I, F> Iterator for Select<I, F>
where
    I: Iterator,
    F: FnMut(I::Item) -> B,
{
    type Item = B;

    fn next(&mut self) -> Option<B> {
        if self.state.is_finished() {
            return None;
        }
        let next = self.source.as_mut()?.next();
        match next {
            Some(item) => {
                self.state = State::Running;
                Some((self.selector)(item))
            }
            None => {
                trace!("select: source exhausted");
                self.source = None;
                self.state = State::Exhausted;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.source {
            Some(ref source) => source.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl<B, I, F> FusedIterator for Select<I, F>
where
    I: Iterator,
    F: FnMut(I::Item) -> B,
{
}

impl<B, I, F> Enumerator for Select<I, F>
where
    I: Iterator,
    F: FnMut(I::Item) -> B,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.source = None;
        self.state = State::Disposed;
    }
}

/// Where over a contiguous buffer.
///
/// The buffer is bounded, so the first pull drains it in one pass: matching positions are staged
/// in a scratch buffer rented from a [`ScratchPool`], copied into an exact-sized list, and the
/// scratch goes back to the pool before the first match is yielded. Matching elements are then
/// re-read by position. The predicate runs once per element.
pub struct WhereBuffer<'p, C, P> {
    buffer: C,
    predicate: P,
    pool: &'p ScratchPool,
    matches: Box<[usize]>,
    cursor: usize,
    state: State,
}

impl<'p, C, P> WhereBuffer<'p, C, P>
where
    C: Contiguous,
    P: FnMut(&C::Elem) -> bool,
{
    /// Fails with [`SequenceError::EmptySource`] if `buffer` is empty, and with
    /// [`SequenceError::Overflow`] if staging every position of `buffer` could not be allocated.
    pub fn new(buffer: C, predicate: P, pool: &'p ScratchPool) -> Result<Self, Error> {
        if buffer.is_empty() {
            return Err(SequenceError::EmptySource.into());
        }
        let staged = buffer.len().checked_mul(mem::size_of::<usize>());
        match staged {
            Some(bytes) if bytes <= isize::max_value() as usize => {}
            _ => return Err(SequenceError::Overflow { what: "where buffer scratch" }.into()),
        }
        Ok(WhereBuffer {
            buffer,
            predicate,
            pool,
            matches: Box::new([]),
            cursor: 0,
            state: State::NotStarted,
        })
    }

    fn drain(&mut self) {
        let mut scratch = self.pool.rent(self.buffer.len().min(SCRATCH_RESERVE));
        let mut pos = 0;
        while let Some((elem, next)) = self.buffer.step(pos) {
            if (self.predicate)(&elem) {
                scratch.push(pos);
            }
            pos = next;
        }
        self.matches = scratch.as_slice().into();
        trace!("where buffer: {} matches staged", self.matches.len());
    }
}

impl<'p, C, P> Iterator for WhereBuffer<'p, C, P>
where
    C: Contiguous,
    P: FnMut(&C::Elem) -> bool,
{
    type Item = C::Elem;

    fn next(&mut self) -> Option<C::Elem> {
        match self.state {
            State::NotStarted => {
                self.drain();
                self.state = State::Running;
            }
            State::Running => {}
            State::Exhausted | State::Disposed => return None,
        }
        match self.matches.get(self.cursor) {
            Some(&pos) => {
                self.cursor += 1;
                self.buffer.step(pos).map(|(elem, _)| elem)
            }
            None => {
                self.matches = Box::new([]);
                self.state = State::Exhausted;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            State::NotStarted => (0, Some(self.buffer.len())),
            State::Running => {
                let remaining = self.matches.len() - self.cursor;
                (remaining, Some(remaining))
            }
            State::Exhausted | State::Disposed => (0, Some(0)),
        }
    }
}

impl<'p, C, P> FusedIterator for WhereBuffer<'p, C, P>
where
    C: Contiguous,
    P: FnMut(&C::Elem) -> bool,
{
}

impl<'p, C, P> Enumerator for WhereBuffer<'p, C, P>
where
    C: Contiguous,
    P: FnMut(&C::Elem) -> bool,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.matches = Box::new([]);
        self.state = State::Disposed;
    }
}

/// Select over a contiguous buffer; projects the element at each position in turn.
#[derive(Debug, Clone)]
pub struct SelectBuffer<C, F> {
    buffer: C,
    selector: F,
    pos: usize,
    state: State,
}

impl<C: Contiguous, F> SelectBuffer<C, F> {
    pub fn new(buffer: C, selector: F) -> Self {
        SelectBuffer {
            buffer,
            selector,
            pos: 0,
            state: State::NotStarted,
        }
    }
}

impl<B, C, F> Iterator for SelectBuffer<C, F>
where
    C: Contiguous,
    F: FnMut(C::Elem) -> B,
{
    type Item = B;

    fn next(&mut self) -> Option<B> {
        if self.state.is_finished() {
            return None;
        }
        match self.buffer.step(self.pos) {
            Some((elem, next)) => {
                self.pos = next;
                self.state = State::Running;
                Some((self.selector)(elem))
            }
            None => {
                self.state = State::Exhausted;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_finished() {
            (0, Some(0))
        } else {
            (0, Some(self.buffer.len() - self.pos))
        }
    }
}

impl<B, C, F> FusedIterator for SelectBuffer<C, F>
where
    C: Contiguous,
    F: FnMut(C::Elem) -> B,
{
}

impl<B, C, F> Enumerator for SelectBuffer<C, F>
where
    C: Contiguous,
    F: FnMut(C::Elem) -> B,
{
    fn state(&self) -> State {
        self.state
    }
    fn dispose(&mut self) {
        self.state = State::Disposed;
    }
}
