mod app_settings;
mod db_settings;
mod oauth_settings;
pub mod traits;

pub use app_settings::*;
pub use db_settings::*;
pub use oauth_settings::*;
