//! HTTP API handlers for msl-analytics

pub mod dashboard;
pub mod engagement;
pub mod health;
pub mod platform;
pub mod plays;
pub mod songs;
pub mod trending;
pub mod users;

pub use dashboard::get_dashboard;
pub use engagement::record_engagement;
pub use health::health_routes;
pub use platform::get_platform_analytics;
pub use plays::track_play;
pub use songs::get_song_analytics;
pub use trending::get_trending;
pub use users::{get_recommendations, get_user_history, get_user_insights};
