pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod genre;
pub mod hexbin;
pub mod scale;
pub mod selection;
pub mod store;
pub mod views;

/// Application name for XDG paths
pub const APP_NAME: &str = "trackdash";
