#![forbid(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod course;
pub mod download;
pub mod error;
pub mod formats;
pub mod http;
pub mod levels;
pub mod logging;
pub mod pipeline;
pub mod scrape;
pub mod transliterate;
