//! Element-level tests shared by splitting (where does a segment end?) and index search (which
//! positions are reported?).

/// Decides whether a single element matches.
pub trait Matcher<T> {
    fn matches(&mut self, item: &T) -> bool;
}

/// Matches elements equal to a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equals<T>(pub T);

impl<T: PartialEq> Matcher<T> for Equals<T> {
    #[inline]
    fn matches(&mut self, item: &T) -> bool {
        *item == self.0
    }
}

/// Matches elements for which the wrapped closure returns `true`
#[derive(Debug, Clone, Copy)]
pub struct Predicate<F>(pub F);

impl<T, F> Matcher<T> for Predicate<F>
where
    F: FnMut(&T) -> bool,
{
    #[inline]
    fn matches(&mut self, item: &T) -> bool {
        (self.0)(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_and_predicate() {
        let mut comma = Equals(',');
        assert!(comma.matches(&','));
        assert!(!comma.matches(&';'));

        let mut calls = 0;
        let mut even = Predicate(|n: &u32| {
            calls += 1;
            n % 2 == 0
        });
        assert!(even.matches(&4));
        assert!(!even.matches(&3));
        drop(even);
        assert_eq!(calls, 2);
    }
}
