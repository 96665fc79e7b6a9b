//! Plain records shared by the store and the admin API.

pub mod base;
pub mod source;
pub mod status;

pub use base::BaseEntity;
pub use source::Source;
pub use status::SourceStatus;
