//! HTTP API handlers for msl-catalog

pub mod health;
pub mod songs;
pub mod stream;

pub use health::health_routes;
pub use songs::{delete_song, get_song, list_songs, upload_song};
pub use stream::{get_stream_url, serve_media};
