//! Assertions applied to every response the probe receives.
//!
//! Checks are pure functions over a captured [`ProbeResponse`]; they never
//! issue requests themselves.

use crate::api_client::ProbeResponse;
use crate::domain::{Invoice, OwnerField, UserId};
use crate::payloads::TAMPERED_STATUS;
use reqwest::StatusCode;

/// Set of status codes a check accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedStatuses(&'static [u16]);

impl AcceptedStatuses {
    /// Injection through a query parameter: processed harmlessly or rejected.
    pub const LIST_INJECTION: Self = Self(&[200, 400, 422]);
    pub const SINGLE_BASELINE: Self = Self(&[200, 404]);
    /// Injection through the id path segment.
    pub const PATH_INJECTION: Self = Self(&[200, 400, 404, 422, 500]);
    pub const PATH_INJECTION_STRICT: Self = Self(&[200, 400, 404, 422]);
    pub const OK_ONLY: Self = Self(&[200]);

    pub fn path_injection(tolerate_server_errors: bool) -> Self {
        if tolerate_server_errors {
            Self::PATH_INJECTION
        } else {
            Self::PATH_INJECTION_STRICT
        }
    }

    pub fn contains(&self, status: StatusCode) -> bool {
        self.0.contains(&status.as_u16())
    }
}

impl std::fmt::Display for AcceptedStatuses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<String> = self.0.iter().map(u16::to_string).collect();
        write!(f, "{{{}}}", codes.join(", "))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Violation {
    #[error("Unexpected status {status}, expected one of {accepted}. Body: {body}")]
    UnexpectedStatus {
        status: StatusCode,
        accepted: AcceptedStatuses,
        body: String,
    },
    #[error("Expected a JSON array of invoices. Body: {0}")]
    NotAList(String),
    #[error("Response body is not valid JSON.")]
    UnreadableBody(#[source] serde_json::Error),
    #[error("Listed invoice carries no usable `id`: {0}")]
    MissingInvoiceId(String),
    #[error("SQL injection: invoice owned by user {found} returned to user {expected}")]
    AuthorizationLeak { expected: UserId, found: String },
    #[error("SQL injection: invoice {invoice_id} has status 'hacked', data was modified")]
    DataCorruption { invoice_id: String },
    #[error("SQL injection: response exposes the `{0}` field")]
    SensitiveFieldLeak(&'static str),
    #[error("Invoice collection unavailable after the payload: listing returned {0}")]
    CollectionUnavailable(StatusCode),
    #[error("Failed to reach the invoice service.")]
    Transport(#[from] reqwest::Error),
}

/// Fields that must never appear in a single-invoice response.
pub const SENSITIVE_FIELDS: &[&str] = &["username", "password"];

fn expect_status(response: &ProbeResponse, accepted: AcceptedStatuses) -> Result<(), Violation> {
    if accepted.contains(response.status) {
        Ok(())
    } else {
        Err(Violation::UnexpectedStatus {
            status: response.status,
            accepted,
            body: response.body.clone(),
        })
    }
}

fn parse_invoice_list(response: &ProbeResponse) -> Result<Vec<serde_json::Value>, Violation> {
    match response.json().map_err(Violation::UnreadableBody)? {
        serde_json::Value::Array(items) => Ok(items),
        _ => Err(Violation::NotAList(response.body.clone())),
    }
}

fn ensure_owned_by(invoice: &Invoice, user_id: &UserId) -> Result<(), Violation> {
    match invoice.owner() {
        OwnerField::Absent => Ok(()),
        OwnerField::Owner(owner) if &owner == user_id => Ok(()),
        OwnerField::Owner(owner) => Err(Violation::AuthorizationLeak {
            expected: user_id.clone(),
            found: owner.to_string(),
        }),
        OwnerField::Unreadable(value) => Err(Violation::AuthorizationLeak {
            expected: user_id.clone(),
            found: value.to_string(),
        }),
    }
}

/// Status must be in `accepted`; a `200` must carry a JSON array in which
/// every invoice that has a `userId` belongs to `user_id`.
pub fn check_listing(
    response: &ProbeResponse,
    user_id: &UserId,
    accepted: AcceptedStatuses,
) -> Result<(), Violation> {
    expect_status(response, accepted)?;
    if response.status != StatusCode::OK {
        return Ok(());
    }
    for item in parse_invoice_list(response)? {
        // Non-object elements carry no owner to compare
        if let Some(invoice) = Invoice::from_json(item) {
            ensure_owned_by(&invoice, user_id)?;
        }
    }
    Ok(())
}

/// An unfiltered listing taken after a payload: must succeed and contain no
/// invoice whose status was overwritten.
pub fn check_untampered(response: &ProbeResponse) -> Result<(), Violation> {
    check_collection_available(response)?;
    for item in parse_invoice_list(response)? {
        let Some(invoice) = Invoice::from_json(item) else {
            continue;
        };
        if invoice.status() == Some(TAMPERED_STATUS) {
            return Err(Violation::DataCorruption {
                invoice_id: invoice.id().unwrap_or_else(|| "<no id>".into()),
            });
        }
    }
    Ok(())
}

pub fn check_collection_available(response: &ProbeResponse) -> Result<(), Violation> {
    if response.status == StatusCode::OK {
        Ok(())
    } else {
        Err(Violation::CollectionUnavailable(response.status))
    }
}

/// Id of the first invoice in a successful listing.
///
/// `Ok(None)` only for an empty array; a listing that cannot be read or whose
/// first element has no `id` is a violation.
pub fn first_invoice_id(response: &ProbeResponse) -> Result<Option<String>, Violation> {
    let Some(first) = parse_invoice_list(response)?.into_iter().next() else {
        return Ok(None);
    };
    let rendered = first.to_string();
    Invoice::from_json(first)
        .and_then(|invoice| invoice.id())
        .map(Some)
        .ok_or(Violation::MissingInvoiceId(rendered))
}

/// Status must be in `accepted`; a `200` carrying a JSON object must not
/// expose credentials and must belong to `user_id` when it names an owner.
pub fn check_single_invoice(
    response: &ProbeResponse,
    user_id: &UserId,
    accepted: AcceptedStatuses,
) -> Result<(), Violation> {
    expect_status(response, accepted)?;
    if response.status != StatusCode::OK {
        return Ok(());
    }
    let body = response.json().map_err(Violation::UnreadableBody)?;
    let Some(invoice) = Invoice::from_json(body) else {
        return Ok(());
    };
    if let Some(field) = SENSITIVE_FIELDS.iter().find(|f| invoice.has_field(f)) {
        return Err(Violation::SensitiveFieldLeak(*field));
    }
    ensure_owned_by(&invoice, user_id)
}
