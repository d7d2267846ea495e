pub mod app;
pub mod backend;
pub mod config;
pub mod debounce;
pub mod feed;
pub mod http_client;
pub mod media;
pub mod nationality;
pub mod projection;
pub mod state;
