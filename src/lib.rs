pub mod config;
pub mod logger;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod post;
pub mod post_loader;
pub mod chart;
pub mod content;
pub mod view;
pub mod site;
pub mod server;
mod query_string;
mod text_utils;
#[cfg(test)]
mod test_data;
