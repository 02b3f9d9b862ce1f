//! Shared configuration structs for the `cache-server` and `store-server`
//! binaries.

pub mod config;
