mod fold;
mod mean;

#[cfg(test)]
mod tests;

pub(crate) use fold::fold_add;
pub use mean::AggregationEngine;
