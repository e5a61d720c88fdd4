use crate::domain::{AuthenticatedIdentity, NewTestUser};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};

/// Thin client for the invoice API under test.
///
/// Every call returns the raw status and body: deciding whether a response is
/// acceptable is the job of [`crate::checks`], not of the client.
#[derive(Clone, Debug)]
pub struct InvoiceApiClient {
    base_url: Url,
    http_client: Client,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiClientError {
    #[error("{0} cannot be used as a base URL.")]
    InvalidBaseUrl(Url),
    #[error("Failed to build the HTTP client.")]
    Build(#[from] reqwest::Error),
}

#[derive(serde::Serialize)]
struct RegisterUserRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(serde::Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Query parameters accepted by `GET /invoices`.
#[derive(serde::Serialize, Debug, Default, Clone, Copy)]
pub struct InvoiceFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<&'a str>,
}

impl<'a> InvoiceFilter<'a> {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn by_status(status: &'a str) -> Self {
        Self {
            status: Some(status),
            operator: None,
        }
    }
}

/// Status and body of one response, captured before any check runs.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ProbeResponse {
    pub async fn capture(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let body = response.text().await?;
        Ok(Self { status, body })
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl InvoiceApiClient {
    pub fn new(
        base_url: Url,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, ApiClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiClientError::InvalidBaseUrl(base_url));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// Appends `segments` to the base URL, one path segment each.
    ///
    /// Segments are only percent-encoded where the URL grammar requires it
    /// (`/`, `?`, `#`, spaces, ...); quotes and semicolons reach the server
    /// as written.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Never fails: `new` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    #[tracing::instrument(name = "Registering test user", skip_all, fields(username = %user.username))]
    pub async fn register_user(&self, user: &NewTestUser) -> Result<ProbeResponse, reqwest::Error> {
        let request_body = RegisterUserRequest {
            username: &user.username,
            password: user.password.expose_secret(),
            email: &user.email,
            first_name: &user.first_name,
            last_name: &user.last_name,
        };
        let response = self
            .http_client
            .post(self.endpoint(&["users"]))
            .json(&request_body)
            .send()
            .await?;
        ProbeResponse::capture(response).await
    }

    #[tracing::instrument(name = "Logging in", skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &Secret<String>,
    ) -> Result<ProbeResponse, reqwest::Error> {
        let response = self
            .http_client
            .post(self.endpoint(&["login"]))
            .json(&LoginRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;
        ProbeResponse::capture(response).await
    }

    #[tracing::instrument(
        name = "Listing invoices",
        skip(self, identity),
        fields(status = tracing::field::Empty)
    )]
    pub async fn list_invoices(
        &self,
        identity: &AuthenticatedIdentity,
        filter: InvoiceFilter<'_>,
    ) -> Result<ProbeResponse, reqwest::Error> {
        let response = self
            .http_client
            .get(self.endpoint(&["invoices"]))
            .header(AUTHORIZATION, identity.authorization_header().expose_secret())
            .query(&filter)
            .send()
            .await?;
        tracing::Span::current().record("status", response.status().as_u16());
        ProbeResponse::capture(response).await
    }

    #[tracing::instrument(
        name = "Fetching invoice",
        skip(self, identity),
        fields(status = tracing::field::Empty)
    )]
    pub async fn get_invoice(
        &self,
        identity: &AuthenticatedIdentity,
        invoice_id: &str,
    ) -> Result<ProbeResponse, reqwest::Error> {
        let response = self
            .http_client
            .get(self.endpoint(&["invoices", invoice_id]))
            .header(AUTHORIZATION, identity.authorization_header().expose_secret())
            .send()
            .await?;
        tracing::Span::current().record("status", response.status().as_u16());
        ProbeResponse::capture(response).await
    }
}
