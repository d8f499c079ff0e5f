//! # Recipe Manager
//!
//! Builds consolidated grocery lists from stored recipes: ingredient amounts
//! written as free text are parsed, summed per ingredient and unit, and
//! formatted back into kitchen-friendly quantities.

pub mod amount;
pub mod config;
pub mod db;
pub mod errors;
pub mod grocery;
pub mod logging;
pub mod models;
pub mod routes;
pub mod store;
