//! Request/response data transfer objects

pub mod contracts;
pub mod invoices;
pub mod tracks;
