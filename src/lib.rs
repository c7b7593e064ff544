//! Scraper for the money.cnn.com Fear & Greed page.
//!
//! [`markets::cnn::FearAndGreed`] fetches the page, extracts the five
//! sentiment readings, the needle image URL and the last update time, and
//! rejects the result if any of them is missing.

pub mod core;
pub mod configs;
pub mod loggers;
pub mod markets;
pub mod retrieve;

pub use crate::core::error::NgError;
pub use markets::cnn::{FearAndGreed, FearAndGreedResult, ValueText};
