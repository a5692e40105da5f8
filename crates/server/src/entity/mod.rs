//! SeaORM entities for every table the account service touches.

pub mod oauth_client;
pub mod oauth_token;
pub mod password_reset_link;
pub mod player;
pub mod player_avatar;
pub mod player_data;
pub mod player_game_settings;
pub mod player_navigator_settings;
pub mod player_sso_token;
pub mod player_website_data;
