/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: greeting probe
/// - `users`: CRUD over the users resource
/// - `upload`: multipart file intake
pub mod health;
pub mod upload;
pub mod users;
