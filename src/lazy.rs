/// A re-iterable lazy sequence.
///
/// A `Lazy` captures a factory for one concrete iterator. Building it does no work at all; every
/// call to [`iter`](Lazy::iter) (or every `for` loop over `&lazy`) creates a *fresh* iterator bound
/// to the same captured parameters. The individual iterators are single pass, the `Lazy` is not.
///
/// # Example
///
/// ```rust
/// use lazy_linq::{Lazy, PullExt};
///
/// let readings = vec![3, 3, 7, 7, 7, 3];
/// let runs = Lazy::new(|| readings.iter().group_runs(|r| **r));
/// let keys: Vec<_> = runs.iter().map(|g| g.key).collect();
/// let sizes: Vec<_> = runs.iter().map(|g| g.members.len()).collect();
/// assert_eq!(keys, vec![3, 7, 3]);
/// assert_eq!(sizes, vec![2, 3, 1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Lazy<F> {
    factory: F,
}

impl<F, I> Lazy<F>
where
    F: Fn() -> I,
    I: Iterator,
{
    pub fn new(factory: F) -> Self {
        Lazy { factory }
    }

    /// A new iterator over this sequence
    #[inline]
    pub fn iter(&self) -> I {
        (self.factory)()
    }

    /// Compose another lazy stage on top of this one; the stage runs on every fresh iterator.
    pub fn then<G, J>(self, stage: G) -> Lazy<impl Fn() -> J>
    where
        G: Fn(I) -> J,
        J: Iterator,
    {
        let factory = self.factory;
        Lazy::new(move || stage(factory()))
    }
}

impl<'l, F, I> IntoIterator for &'l Lazy<F>
where
    F: Fn() -> I,
    I: Iterator,
{
    type Item = I::Item;
    type IntoIter = I;

    fn into_iter(self) -> I {
        self.iter()
    }
}

/// A lazy sequence over any re-iterable source: each iteration clones the source and iterates
/// the clone. Cloning a borrowed source (a slice, a `Lazy` reference, a range) is cheap.
pub fn sequence<S>(source: S) -> Lazy<impl Fn() -> S::IntoIter>
where
    S: IntoIterator + Clone,
{
    Lazy::new(move || source.clone().into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PullExt;
    use std::cell::Cell;

    #[test]
    fn construction_pulls_nothing() {
        let pulls = Cell::new(0);
        let data = vec![1, 2, 3, 4];
        let evens = Lazy::new(|| {
            data.iter()
                .inspect(|_| pulls.set(pulls.get() + 1))
                .where_by(|n| **n % 2 == 0)
        });
        assert_eq!(pulls.get(), 0);
        let mut first = evens.iter();
        assert_eq!(pulls.get(), 0);
        assert_eq!(first.next(), Some(&2));
        assert_eq!(pulls.get(), 2);
        drop(first);

        let all: Vec<_> = evens.iter().collect();
        assert_eq!(all, vec![&2, &4]);
        assert_eq!(pulls.get(), 6);
    }

    #[test]
    fn then_composes_stages() {
        let text = "1,2,,3";
        let fields = sequence(text.chars())
            .then(|chars| chars.split_on(','))
            .then(|fields| fields.select(|f| f.into_iter().collect::<String>()));
        let once: Vec<_> = fields.iter().collect();
        let twice: Vec<_> = (&fields).into_iter().collect();
        assert_eq!(once, vec!["1", "2", "", "3"]);
        assert_eq!(once, twice);
    }
}
