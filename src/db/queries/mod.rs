//! Database queries

pub mod amc;
pub mod customer;
pub mod employee;
pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;
pub mod notification;
pub mod service_request;
pub mod zone;
