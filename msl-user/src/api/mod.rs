//! HTTP API handlers for msl-user

pub mod auth;
pub mod auth_middleware;
pub mod favorites;
pub mod health;
pub mod history;
pub mod playlists;
pub mod profile;

pub use auth::{login, register};
pub use auth_middleware::auth_middleware;
pub use favorites::{add_favorite, list_favorites, remove_favorite};
pub use health::{database_info, health_routes};
pub use history::{list_history, record_history};
pub use playlists::{
    add_playlist_song, create_playlist, delete_playlist, get_playlist, list_playlists,
    remove_playlist_song, update_playlist,
};
pub use profile::{change_password, get_profile, update_profile};
