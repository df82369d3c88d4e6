pub mod db;
pub mod helpers;
pub mod repo;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use db::*;
pub use repo::*;
pub use types::*;
