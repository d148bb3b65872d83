pub mod api;
pub mod legacy;
pub mod models;
