//! Transformer trait for record transformation

use eyre::Result;

/// Transformer trait for reshaping extracted items before they are loaded
///
/// Transformers are synchronous: they only touch data already in memory.
///
/// # Example
/// ```no_run
/// use isams_etl::etl::{Record, Transformer};
/// use eyre::Result;
///
/// struct DropColumns {
///     columns: Vec<String>,
/// }
///
/// impl Transformer for DropColumns {
///     type Input = Record;
///     type Output = Record;
///
///     fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
///         for column in &self.columns {
///             input.remove(column);
///         }
///         Ok(input)
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if the item cannot be converted
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform a whole page of items, preserving order
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }

    /// Feed the output of this transformer into `next`
    fn then<N>(self, next: N) -> Then<Self, N>
    where
        Self: Sized,
        N: Transformer<Input = Self::Output>,
    {
        Then {
            first: self,
            second: next,
        }
    }
}

/// Two transformers applied in sequence, see [`Transformer::then`]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B> Transformer for Then<A, B>
where
    A: Transformer,
    B: Transformer<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        self.second.transform(self.first.transform(input)?)
    }
}
