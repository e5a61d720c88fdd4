use crate::api_client::InvoiceApiClient;
use crate::configuration::IdentitySettings;
use crate::domain::{AuthenticatedIdentity, NewTestUser, UserId};
use reqwest::StatusCode;
use secrecy::Secret;

#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("Failed to create user: {status} {body}")]
    RegistrationRejected { status: StatusCode, body: String },
    #[error("Failed to login: {status} {body}")]
    LoginRejected { status: StatusCode, body: String },
    #[error("Login response does not carry a `token` and a `userId`.")]
    MalformedLoginResponse(#[source] serde_json::Error),
    #[error("Failed to reach the invoice service.")]
    Transport(#[from] reqwest::Error),
}

#[derive(serde::Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "userId")]
    user_id: UserId,
}

/// Registers a fresh test user and signs in with it.
///
/// The user is never deleted afterwards.
#[tracing::instrument(
    name = "Establishing test identity",
    skip_all,
    fields(username = tracing::field::Empty, user_id = tracing::field::Empty),
    err
)]
pub async fn establish_identity(
    client: &InvoiceApiClient,
    settings: &IdentitySettings,
) -> Result<AuthenticatedIdentity, FixtureError> {
    let user = NewTestUser::generate(settings);
    tracing::Span::current().record("username", tracing::field::display(&user.username));

    let registration = client.register_user(&user).await?;
    if registration.status != StatusCode::CREATED {
        return Err(FixtureError::RegistrationRejected {
            status: registration.status,
            body: registration.body,
        });
    }

    let login = client.login(&user.username, &user.password).await?;
    if login.status != StatusCode::OK {
        return Err(FixtureError::LoginRejected {
            status: login.status,
            body: login.body,
        });
    }
    let LoginResponse { token, user_id } =
        serde_json::from_str(&login.body).map_err(FixtureError::MalformedLoginResponse)?;
    tracing::Span::current().record("user_id", tracing::field::display(&user_id));

    Ok(AuthenticatedIdentity {
        username: user.username,
        token: Secret::new(token),
        user_id,
    })
}
