use crate::checks::Violation;
use crate::telemetry::error_chain_fmt;

/// One independent probe, run in the order of [`ProbeCase::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeCase {
    ListInvoicesWorksNormally,
    ListInvoicesWithKnownStatusIsScoped,
    UnionSelectInStatusIsContained,
    OrTautologyInStatusIsContained,
    DestructiveStatementsInStatusAreContained,
    OperatorInjectionIsContained,
    GetInvoiceWorksNormally,
    InvoiceIdInjectionIsContained,
}

impl ProbeCase {
    pub const ALL: [ProbeCase; 8] = [
        ProbeCase::ListInvoicesWorksNormally,
        ProbeCase::ListInvoicesWithKnownStatusIsScoped,
        ProbeCase::UnionSelectInStatusIsContained,
        ProbeCase::OrTautologyInStatusIsContained,
        ProbeCase::DestructiveStatementsInStatusAreContained,
        ProbeCase::OperatorInjectionIsContained,
        ProbeCase::GetInvoiceWorksNormally,
        ProbeCase::InvoiceIdInjectionIsContained,
    ];

    pub fn group(&self) -> &'static str {
        match self {
            ProbeCase::GetInvoiceWorksNormally | ProbeCase::InvoiceIdInjectionIsContained => {
                "get_invoice"
            }
            _ => "list_invoices",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProbeCase::ListInvoicesWorksNormally => "list_invoices_works_normally",
            ProbeCase::ListInvoicesWithKnownStatusIsScoped => {
                "list_invoices_with_known_status_is_scoped"
            }
            ProbeCase::UnionSelectInStatusIsContained => "union_select_in_status_is_contained",
            ProbeCase::OrTautologyInStatusIsContained => "or_tautology_in_status_is_contained",
            ProbeCase::DestructiveStatementsInStatusAreContained => {
                "destructive_statements_in_status_are_contained"
            }
            ProbeCase::OperatorInjectionIsContained => "operator_injection_is_contained",
            ProbeCase::GetInvoiceWorksNormally => "get_invoice_works_normally",
            ProbeCase::InvoiceIdInjectionIsContained => "invoice_id_injection_is_contained",
        }
    }
}

impl std::fmt::Display for ProbeCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.group(), self.name())
    }
}

/// Why a case failed, and which payload was in flight when it did.
#[derive(thiserror::Error)]
#[error("{}", describe(.payload, .violation))]
pub struct CaseFailure {
    pub payload: Option<&'static str>,
    #[source]
    pub violation: Violation,
}

fn describe(payload: &Option<&'static str>, violation: &Violation) -> String {
    match payload {
        Some(payload) => format!("payload {payload:?}: {violation}"),
        None => violation.to_string(),
    }
}

impl std::fmt::Debug for CaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl CaseFailure {
    pub fn at(payload: &'static str) -> impl FnOnce(Violation) -> Self {
        move |violation| Self {
            payload: Some(payload),
            violation,
        }
    }
}

impl From<Violation> for CaseFailure {
    fn from(violation: Violation) -> Self {
        Self {
            payload: None,
            violation,
        }
    }
}

impl From<reqwest::Error> for CaseFailure {
    fn from(e: reqwest::Error) -> Self {
        Violation::Transport(e).into()
    }
}
