/// Data models
///
/// This module contains the persisted resources and their repository
/// operations:
///
/// - `user`: the `users` table (the only persisted entity)
pub mod user;
