//! Type definitions

pub mod amc;
pub mod customer;
pub mod employee;
pub mod leave;
pub mod messages;
pub mod notification;
pub mod service_request;
pub mod zone;

pub use amc::*;
pub use customer::*;
pub use employee::*;
pub use leave::*;
pub use messages::*;
pub use notification::*;
pub use service_request::*;
pub use zone::*;
