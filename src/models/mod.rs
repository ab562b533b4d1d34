//! Wire types for listings, collections and profile data.

pub mod collection;
pub mod listing;
pub mod profile;

pub use collection::Collection;
pub use listing::{Listing, ListingDraft, ListingPage, ListingSource, ListingUpdate, Upvotes};
pub use profile::{ProfileUpdate, SupportMessage, UserStats};
