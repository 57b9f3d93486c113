#![allow(clippy::needless_for_each)]

use crate::api::handlers::{
    Message,
    auth::{self, Credentials, PasswordReset},
    health::{self, Health},
    root,
    update::{self, EmailChange},
};
use crate::identity::{AuthUri, AuthUser, FederatedCallback, Registration, UserCredential};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::register,
        auth::login,
        auth::google_start,
        auth::google_finish,
        auth::reset_password,
        auth::logout,
        auth::profile,
        update::email,
        update::email_verify,
    ),
    components(schemas(
        Message,
        Health,
        Credentials,
        PasswordReset,
        EmailChange,
        AuthUser,
        UserCredential,
        Registration,
        AuthUri,
        FederatedCallback,
    )),
    tags(
        (name = "izz", description = "Task dashboard API"),
        (name = "auth", description = "Sign-up, sign-in and profile provisioning"),
        (name = "update", description = "Account changes for the signed-in user"),
    )
)]
pub(crate) struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/",
            "/health",
            "/auth/register",
            "/auth/login",
            "/auth/google",
            "/auth/reset-password",
            "/auth/logout",
            "/auth/profile/{uid}",
            "/update/email",
            "/update/email/verify",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
