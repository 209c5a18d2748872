//! Student records library
//!
//! Student records, education history and lookup tables, with PDF report
//! generation. The binary drives this library over a JSON-lines protocol;
//! the library is also used directly by the integration tests.

pub mod actions;
pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod reporting;
pub mod services;
pub mod storage;
pub mod wizards;
