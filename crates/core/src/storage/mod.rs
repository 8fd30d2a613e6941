//! SQLite archive of finished matches

mod db;
mod models;

pub use db::MatchArchive;
pub use models::*;
