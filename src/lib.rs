//! News App - A Guardian search API client
//!
//! This crate fetches the latest articles from a news search endpoint,
//! extracts them into plain records, and lists them on a small web page
//! whose entries open the full article in the browser.

pub mod article;
pub mod config;
pub mod connectivity;
pub mod fetcher;
pub mod parser;
pub mod routes;
