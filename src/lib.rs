//! Fight-statistics pipeline: scrape fight pages, parse them into typed
//! fight/round records, and store them in SQLite.

pub mod error;
pub mod fight_db;
pub mod fight_parse;
pub mod files;
pub mod issues;
pub mod models;
pub mod normalize;
pub mod page;
pub mod report;
pub mod scrape;
