//! Thinkers News - A sectioned news front page
//!
//! This crate pulls RSS feeds through public JSON-bridging proxies,
//! normalizes their items into articles and serves them as a sectioned
//! web page.

pub mod aggregator;
pub mod article;
pub mod config;
pub mod feeds;
pub mod fetcher;
pub mod layout;
pub mod proxy;
pub mod routes;
pub mod snapshot;
