//! Caller-side validation rules
//!
//! The repositories persist whatever they are given; these checks are for
//! callers that want to reject bad input before opening a transaction.

pub mod validation;

pub use validation::{validate_commande, validate_stock};
