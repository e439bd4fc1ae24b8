//! Request handlers

pub mod contracts;
pub mod health;
pub mod invoices;
pub mod tracks;
