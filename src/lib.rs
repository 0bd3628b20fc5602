pub mod config;
pub mod content;
pub mod html_generator;
pub mod language;
pub mod logger;
pub mod pages;
pub mod query_string;
pub mod server;
pub mod sitemap;
pub mod tags;
pub mod text_utils;
pub mod view;
mod test_data;
