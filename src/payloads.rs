//! Fixed catalogue of injection payloads.
//!
//! Payloads are literal strings, never generated, so that two runs against
//! the same server send exactly the same requests.

/// Sent as the `status` query parameter of `GET /invoices`.
pub const UNION_SELECT: &[&str] = &[
    "' UNION SELECT * FROM users--",
    "' UNION SELECT id, userId, amount, dueDate, 'hacked' FROM invoices--",
];

/// Sent as the `status` query parameter of `GET /invoices`.
pub const OR_TAUTOLOGY: &[&str] = &["' OR '1'='1", "' OR 1=1--", "admin' OR '1'='1'--"];

/// Stacked statements sent as the `status` query parameter of `GET /invoices`.
pub const DESTRUCTIVE: &[&str] = &[
    "'; DROP TABLE invoices--",
    "'; DELETE FROM invoices--",
    "'; UPDATE invoices SET status='hacked'--",
];

/// Sent as the `operator` query parameter of `GET /invoices`, next to a
/// legitimate [`OPERATOR_STATUS`].
pub const OPERATOR: &[&str] = &[
    "eq' OR '1'='1",
    "= 'paid' OR 1=1--",
    "ne'; UPDATE invoices SET status='hacked'--",
];

pub const OPERATOR_STATUS: &str = "paid";

/// Substituted verbatim for the id segment of `GET /invoices/{id}`.
pub const INVOICE_ID: &[&str] = &[
    "1' OR '1'='1",
    "1' UNION SELECT * FROM users--",
    "1'; DROP TABLE invoices--",
];

/// Status values the service is expected to understand.
pub const KNOWN_STATUSES: &[&str] = &["paid", "unpaid"];

/// Value a successful `UPDATE` payload would leave behind.
pub const TAMPERED_STATUS: &str = "hacked";
