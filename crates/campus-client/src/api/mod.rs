//! API endpoint implementations.

mod identity;
mod resource;

pub use identity::{IdentityApi, LOGIN_PATH};
pub use resource::{ADMIN_RESOURCES, ResourceApi};
