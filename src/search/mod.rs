//! Directory search: the hybrid (directory + AI) merger and the debounced
//! search-as-you-type front end.

pub mod debouncer;
pub mod hybrid;
pub mod normalize;

pub use debouncer::{DebouncedSearch, Debouncer, SearchOutcome, Tagged};
pub use hybrid::{merge_results, should_augment, HybridSearch, SearchBackend, SearchResults};
