//! Filter engine
//!
//! Selections are translated into composable [`BatchFilter`]s that run over
//! the Arrow batch backing a [`HospitalTable`](crate::models::HospitalTable).

pub mod core;
pub mod selection;

pub use self::core::{
    AndFilter, BatchFilter, ExcludeAllFilter, IncludeAllFilter, ValueSetFilter,
    filter_record_batch,
};
pub use self::selection::{FilterSelection, FilteredView, apply};
