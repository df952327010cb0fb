pub mod address;
pub mod booking;
pub mod chat;
pub mod convert;
pub mod payment;
pub mod repository;
pub mod subscription;
pub mod types;
pub mod validation;

pub use types::{DocumentId, UserId};
