//! Services - one per area of the API, all sharing the same `ApiClient`.

pub mod auth_service;
pub mod collection_service;
pub mod contact_service;
pub mod listing_service;
pub mod profile_service;

use crate::api::ApiClient;

pub use auth_service::{AuthService, PasswordCheck};
pub use collection_service::CollectionService;
pub use contact_service::ContactService;
pub use listing_service::{ActionOutcome, ListingQuery, ListingService, DEFAULT_PAGE_SIZE};
pub use profile_service::ProfileService;

/// Every service wired to one client, so they share a session
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub listings: ListingService,
    pub collections: CollectionService,
    pub profile: ProfileService,
    pub contact: ContactService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            listings: ListingService::new(client.clone()),
            collections: CollectionService::new(client.clone()),
            profile: ProfileService::new(client.clone()),
            contact: ContactService::new(client),
        }
    }
}
