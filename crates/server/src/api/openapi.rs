//! OpenAPI/Utoipa configuration.

use crate::api::{
    accounts::ACCOUNTS_TAG, health::MISC_TAG, password_reset::PASSWORD_RESET_TAG,
};
use crate::oauth2::AUTH_TAG;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .description(Some(
                    "Access token obtained from `/auth/token` or `/auth/login`.",
                ))
                .build();
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(bearer));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Player Auth API",
        version = "1.0.0",
        description = "Accounts, access tokens, single sign-on and password recovery for the hotel."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = AUTH_TAG, description = "Access tokens and single sign-on"),
        (name = ACCOUNTS_TAG, description = "Account registration and settings"),
        (name = PASSWORD_RESET_TAG, description = "Password recovery by email")
    )
)]
pub struct ApiDoc;
