use super::handlers::{auth, health, root};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::provider::login_provider,
        auth::provider::callback,
        auth::provider::logout,
        auth::provider::api_user,
        auth::token::login,
        auth::token::refresh,
        auth::principal::protected_user,
    ),
    modifiers(&BearerScheme),
    tags(
        (name = "delegated", description = "Login through an external identity provider"),
        (name = "token", description = "Password login and bearer tokens"),
        (name = "health", description = "Liveness")
    )
)]
struct ApiDoc;

struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// `OpenAPI` document of every served route; info comes from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
