use crate::api_client::InvoiceApiClient;
use secrecy::Secret;
use serde_aux::field_attributes::{
    deserialize_bool_from_anything, deserialize_option_number_from_string,
};

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub target: TargetSettings,
    pub identity: IdentitySettings,
    pub policy: PolicySettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct TargetSettings {
    pub base_url: String,
    // Unset means the HTTP client defaults apply
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_milliseconds: Option<u64>,
}

impl TargetSettings {
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_milliseconds
            .map(std::time::Duration::from_millis)
    }

    pub fn client(&self) -> Result<InvoiceApiClient, anyhow::Error> {
        let base_url = reqwest::Url::parse(&self.base_url)?;
        let client = InvoiceApiClient::new(base_url, self.timeout())?;
        Ok(client)
    }
}

/// Template for the throwaway user registered at the start of every run.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct IdentitySettings {
    pub username_prefix: String,
    pub password: Secret<String>,
    pub email_domain: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct PolicySettings {
    /// Accept `500 Internal Server Error` when an injection payload is placed
    /// in the invoice id path segment.
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub tolerate_server_errors_on_path: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            tolerate_server_errors_on_path: true,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_TARGET__BASE_URL=http://10.0.0.5:5000` would set `Settings.target.base_url`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible environments the probe runs in.
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Ci,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Ci => "ci",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ci" => Ok(Self::Ci),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `ci`.",
                other
            )),
        }
    }
}
