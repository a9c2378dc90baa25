//! Core types and logic for tierteam: tier ordering, native-tier resolution,
//! duplicate purging, random team assembly and Showdown formatting.
//!
//! This crate is free of database and HTTP dependencies. Storage is reached
//! only through the [`store::BuildStore`] trait.

pub mod assemble;
pub mod build;
pub mod error;
pub mod memory;
pub mod purge;
pub mod resolver;
pub mod showdown;
pub mod store;
pub mod tier;

pub use error::{Error, Result};
