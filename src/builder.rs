use std::fmt::Debug;
use std::marker::PhantomData;

use failure::Error;
use scroll::ctx::SizeWith;
use scroll::{self, ctx};

use crate::{ScrollTransducer, SequenceError, Transducer};

/// A builder is useful for when the transducer needs to be constructed incrementally, i.e.,
/// certain information is present later on, or is optional, etc.
///
/// # Example
///
/// ```rust
/// use lazy_linq::{Builder, ContiguousExt, Transducer};
///
/// let words = ["alpha", "beta", "gamma", "delta", "epsilon"];
/// let mut builder = Builder::new(&words[..]).transducer(|input, index| input[index].len());
/// let maybe_header_rows = Some(1);
/// if let Some(skip) = maybe_header_rows {
///     builder = builder.skip(skip);
/// }
/// let lengths: Transducer<_, usize> = builder.count(4).finish().unwrap();
/// let runs: Vec<_> = lengths.group_runs(|len| *len).map(|run| run.key).collect();
/// assert_eq!(runs, vec![4, 5, 7]);
/// ```
pub struct Builder<'a, Input, Output>
where
    Input: 'a + Copy,
    Output: 'a,
{
    input: Option<Input>,
    count: usize,
    skip: usize,
    transducer: Option<fn(Input, usize) -> Output>,
    _marker: PhantomData<&'a (Input, Output)>,
}

impl<'a, Input, Output> Builder<'a, Input, Output>
where
    Input: 'a + Copy,
    Output: 'a,
{
    /// Creates an empty builder; you must set the input and transducer before calling `finish`
    /// otherwise this is a runtime error.
    pub fn empty() -> Self {
        Builder {
            input: None,
            count: 0,
            skip: 0,
            transducer: None,
            _marker: PhantomData,
        }
    }
    /// Create a new builder with the given `input`; you must set the transducer before calling
    /// `finish` otherwise this is a runtime error.
    pub fn new(input: Input) -> Self {
        Builder {
            input: Some(input),
            ..Self::empty()
        }
    }
    /// Set (or reset) the input.
    pub fn input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }
    /// Set the number of visible elements.
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
    /// Start the visible window `skip` elements into the input; the transducer is still called with
    /// absolute indices.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
    /// Set the transducer from input source to output elements.
    pub fn transducer(mut self, transducer: fn(Input, usize) -> Output) -> Self {
        self.transducer = Some(transducer);
        self
    }
    /// Finish building the transducer, and return it; if the input source or the transducer is
    /// missing, or the window does not fit in `usize`, this is a runtime error.
    pub fn finish(self) -> Result<Transducer<'a, Input, Output>, Error> {
        let contents = self
            .input
            .ok_or_else(|| SequenceError::BuilderError("No input given".to_string()))?;
        let transducer = self
            .transducer
            .ok_or_else(|| SequenceError::BuilderError("No transducer given".to_string()))?;
        self.skip
            .checked_add(self.count)
            .ok_or(SequenceError::Overflow { what: "builder window" })?;
        Ok(Transducer {
            contents,
            count: self.count,
            offset: self.skip,
            transducer,
            _marker: PhantomData,
        })
    }
}

impl<'a, Output> Builder<'a, &'a [u8], Output> {
    /// Create a scroll-based transducer with the given parsing `ctx`; a `skip` drops that many
    /// leading records.
    pub fn parse_with<Ctx, E>(self, ctx: Ctx) -> Result<ScrollTransducer<'a, Output, Ctx>, Error>
    where
        Ctx: Default + Copy,
        E: From<scroll::Error> + Debug,
        Output: 'a + ctx::TryFromCtx<'a, Ctx, Error = E, Size = usize> + SizeWith<Ctx, Units = usize>,
    {
        let input = self
            .input
            .ok_or_else(|| SequenceError::BuilderError("No input given".to_string()))?;
        let total = self
            .skip
            .checked_add(self.count)
            .ok_or(SequenceError::Overflow { what: "builder window" })?;
        let all = ScrollTransducer::parse_with(input, total, ctx)?;
        all.window(self.skip..total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parts_are_errors() {
        let data = [1u8, 2, 3];
        let missing_transducer = Builder::<&[u8], u8>::new(&data[..]).count(3).finish();
        assert_eq!(
            missing_transducer.unwrap_err().downcast_ref::<SequenceError>(),
            Some(&SequenceError::BuilderError("No transducer given".to_string()))
        );

        let missing_input = Builder::<&[u8], u8>::empty()
            .transducer(|input, idx| input[idx])
            .finish();
        assert!(missing_input.is_err());
    }

    #[test]
    fn window_overflow() {
        let data = [1u8];
        let err = Builder::new(&data[..])
            .transducer(|input: &[u8], idx| input[idx])
            .skip(usize::max_value())
            .count(2)
            .finish()
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SequenceError>(),
            Some(&SequenceError::Overflow { what: "builder window" })
        );
    }

    #[test]
    fn parse_with_skips_records() {
        let bytes = [9u8, 0, 1, 0, 2, 0];
        let lt = Builder::new(&bytes[..])
            .skip(1)
            .count(2)
            .parse_with::<_, scroll::Error>(scroll::LE)
            .unwrap();
        let records: Vec<u16> = lt.into_iter().collect();
        assert_eq!(records, vec![1, 2]);
    }
}
