mod invoice;
mod test_identity;
mod user_id;

pub use invoice::{Invoice, OwnerField};
pub use test_identity::{AuthenticatedIdentity, NewTestUser, USERNAME_SUFFIX_RANGE};
pub use user_id::UserId;
