use crate::configuration::IdentitySettings;
use crate::domain::UserId;
use rand::Rng;
use secrecy::{ExposeSecret, Secret};

/// Bounds of the random username suffix.
pub const USERNAME_SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 1000..=999999;

/// Registration data for the throwaway user a probe run signs in as.
#[derive(Debug, Clone)]
pub struct NewTestUser {
    pub username: String,
    pub password: Secret<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewTestUser {
    pub fn generate(settings: &IdentitySettings) -> Self {
        let suffix = rand::thread_rng().gen_range(USERNAME_SUFFIX_RANGE);
        Self::with_suffix(settings, suffix)
    }

    pub fn with_suffix(settings: &IdentitySettings, suffix: u32) -> Self {
        let username = format!("{}{}", settings.username_prefix, suffix);
        let email = format!("{}@{}", username, settings.email_domain);
        Self {
            username,
            password: settings.password.clone(),
            email,
            first_name: settings.first_name.clone(),
            last_name: settings.last_name.clone(),
        }
    }
}

/// The signed-in test user, shared read-only by every probe case of a run.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub username: String,
    pub token: Secret<String>,
    pub user_id: UserId,
}

impl AuthenticatedIdentity {
    pub fn authorization_header(&self) -> Secret<String> {
        Secret::new(format!("Bearer {}", self.token.expose_secret()))
    }
}
