//! Session state: the signed-in user, their access token, and where both are kept.

pub mod context;
pub mod model;
pub mod storage;

pub use context::{LogoutReason, SessionContext, SessionEvent};
pub use model::{AuthResponse, Session, User};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
