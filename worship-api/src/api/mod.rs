//! HTTP API handlers for worship-api

pub mod auth;
pub mod error;
pub mod health;
pub mod info;
pub mod login;
pub mod members;
pub mod params;
pub mod rate_limit;
pub mod scales;
pub mod songs;

pub use auth::auth_middleware;
pub use error::ApiError;
pub use health::health_routes;
pub use info::{route_not_found, service_info};
pub use login::login;
pub use members::{create_member, delete_member, get_member, list_members, update_member};
pub use rate_limit::rate_limit_middleware;
pub use scales::{create_scale, delete_scale, get_scale, list_scales, update_scale};
pub use songs::{create_song, delete_song, get_song, list_songs, update_song};
