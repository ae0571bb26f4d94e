//! Gamestore - federated game catalog
//!
//! Presents one catalog over a canonical SQL store and a legacy Northwind
//! document store, copying legacy records into the canonical store the
//! first time a write touches them.

pub mod config;
pub mod identity;
pub mod interfaces;
pub mod mapper;
pub mod migration;
pub mod model;
pub mod pipeline;
pub mod repository;
pub mod services;
pub mod storage;
pub mod utils;
