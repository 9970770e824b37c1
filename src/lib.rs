//! Fieldbook: dynamic custom fields for field service records
//!
//! A schema engine that lets an operator define extra typed attributes
//! on the fixed business record kinds (customers, sites, assets, jobs,
//! estimates, invoices) at run time, validates values written against
//! those definitions, stores them generically, and moves whole
//! attribute sets between installations as portable JSON documents.

pub mod cli;
pub mod core;
pub mod fields;
pub mod store;
pub mod transfer;
pub mod validate;
