pub mod auth;
pub mod error;
pub mod images;
pub mod middleware;
pub mod quizzes;
pub mod routes;
pub mod service;
pub mod state;
