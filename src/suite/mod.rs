//! Sequential runner for the SQL-injection probe cases.

mod case;
mod report;

pub use case::{CaseFailure, ProbeCase};
pub use report::{CaseOutcome, SuiteReport};

use crate::api_client::{InvoiceApiClient, InvoiceFilter};
use crate::checks::{
    AcceptedStatuses, Violation, check_collection_available, check_listing, check_single_invoice,
    check_untampered, first_invoice_id,
};
use crate::configuration::{PolicySettings, Settings};
use crate::domain::AuthenticatedIdentity;
use crate::fixture::establish_identity;
use crate::payloads;

pub struct InvoiceProbeSuite {
    client: InvoiceApiClient,
    identity: AuthenticatedIdentity,
    policy: PolicySettings,
}

/// Builds the client, establishes the test identity and runs every case.
///
/// Only a failure to set up the identity is returned as an error; failing
/// cases are recorded in the report.
#[tracing::instrument(name = "Running SQL injection probe", skip_all, err)]
pub async fn run_suite(settings: &Settings) -> Result<SuiteReport, anyhow::Error> {
    let client = settings.target.client()?;
    let identity = establish_identity(&client, &settings.identity).await?;
    let suite = InvoiceProbeSuite::new(client, identity, settings.policy.clone());
    Ok(suite.run().await)
}

impl InvoiceProbeSuite {
    pub fn new(
        client: InvoiceApiClient,
        identity: AuthenticatedIdentity,
        policy: PolicySettings,
    ) -> Self {
        Self {
            client,
            identity,
            policy,
        }
    }

    #[tracing::instrument(
        name = "Probe run",
        skip(self),
        fields(run_id = tracing::field::Empty, username = %self.identity.username)
    )]
    pub async fn run(&self) -> SuiteReport {
        let run_id = uuid::Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let mut outcomes = Vec::with_capacity(ProbeCase::ALL.len());
        for case in ProbeCase::ALL {
            let result = self.run_case(case).await;
            outcomes.push(CaseOutcome { case, result });
        }
        SuiteReport {
            run_id,
            username: self.identity.username.clone(),
            outcomes,
        }
    }

    #[tracing::instrument(name = "Probe case", skip(self), fields(case = %case))]
    pub async fn run_case(&self, case: ProbeCase) -> Result<(), CaseFailure> {
        let result = match case {
            ProbeCase::ListInvoicesWorksNormally => self.list_invoices_works_normally().await,
            ProbeCase::ListInvoicesWithKnownStatusIsScoped => {
                self.list_invoices_with_known_status_is_scoped().await
            }
            ProbeCase::UnionSelectInStatusIsContained => {
                self.status_injection_is_contained(payloads::UNION_SELECT)
                    .await
            }
            ProbeCase::OrTautologyInStatusIsContained => {
                self.status_injection_is_contained(payloads::OR_TAUTOLOGY)
                    .await
            }
            ProbeCase::DestructiveStatementsInStatusAreContained => {
                self.destructive_statements_are_contained().await
            }
            ProbeCase::OperatorInjectionIsContained => {
                self.operator_injection_is_contained().await
            }
            ProbeCase::GetInvoiceWorksNormally => self.get_invoice_works_normally().await,
            ProbeCase::InvoiceIdInjectionIsContained => {
                self.invoice_id_injection_is_contained().await
            }
        };
        match &result {
            Ok(()) => tracing::info!("Probe case passed"),
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Probe case failed"
            ),
        }
        result
    }

    async fn list_invoices_works_normally(&self) -> Result<(), CaseFailure> {
        let response = self
            .client
            .list_invoices(&self.identity, InvoiceFilter::unfiltered())
            .await?;
        check_listing(&response, &self.identity.user_id, AcceptedStatuses::OK_ONLY)?;
        Ok(())
    }

    async fn list_invoices_with_known_status_is_scoped(&self) -> Result<(), CaseFailure> {
        for &status in payloads::KNOWN_STATUSES {
            let response = self
                .client
                .list_invoices(&self.identity, InvoiceFilter::by_status(status))
                .await?;
            check_listing(&response, &self.identity.user_id, AcceptedStatuses::OK_ONLY)
                .map_err(CaseFailure::at(status))?;
        }
        Ok(())
    }

    async fn status_injection_is_contained(
        &self,
        payloads: &'static [&'static str],
    ) -> Result<(), CaseFailure> {
        for &payload in payloads {
            self.probe_listing(InvoiceFilter::by_status(payload))
                .await
                .map_err(CaseFailure::at(payload))?;
        }
        Ok(())
    }

    async fn destructive_statements_are_contained(&self) -> Result<(), CaseFailure> {
        for &payload in payloads::DESTRUCTIVE {
            self.probe_listing(InvoiceFilter::by_status(payload))
                .await
                .and(self.verify_untampered().await)
                .map_err(CaseFailure::at(payload))?;
        }
        Ok(())
    }

    async fn operator_injection_is_contained(&self) -> Result<(), CaseFailure> {
        for &payload in payloads::OPERATOR {
            let filter = InvoiceFilter {
                status: Some(payloads::OPERATOR_STATUS),
                operator: Some(payload),
            };
            self.probe_listing(filter)
                .await
                .and(self.verify_untampered().await)
                .map_err(CaseFailure::at(payload))?;
        }
        Ok(())
    }

    async fn get_invoice_works_normally(&self) -> Result<(), CaseFailure> {
        let listing = self
            .client
            .list_invoices(&self.identity, InvoiceFilter::unfiltered())
            .await?;
        if check_collection_available(&listing).is_err() {
            return Ok(());
        }
        let Some(invoice_id) = first_invoice_id(&listing)? else {
            tracing::info!("No invoice available to fetch");
            return Ok(());
        };
        let response = self.client.get_invoice(&self.identity, &invoice_id).await?;
        check_single_invoice(
            &response,
            &self.identity.user_id,
            AcceptedStatuses::SINGLE_BASELINE,
        )?;
        Ok(())
    }

    async fn invoice_id_injection_is_contained(&self) -> Result<(), CaseFailure> {
        let accepted =
            AcceptedStatuses::path_injection(self.policy.tolerate_server_errors_on_path);
        for &payload in payloads::INVOICE_ID {
            self.probe_single(payload, accepted)
                .await
                .and(self.verify_collection_available().await)
                .map_err(CaseFailure::at(payload))?;
        }
        Ok(())
    }

    async fn probe_listing(&self, filter: InvoiceFilter<'_>) -> Result<(), Violation> {
        let response = self.client.list_invoices(&self.identity, filter).await?;
        tracing::debug!(status = %response.status, "Payload response received");
        check_listing(
            &response,
            &self.identity.user_id,
            AcceptedStatuses::LIST_INJECTION,
        )
    }

    async fn probe_single(
        &self,
        invoice_id: &str,
        accepted: AcceptedStatuses,
    ) -> Result<(), Violation> {
        let response = self.client.get_invoice(&self.identity, invoice_id).await?;
        tracing::debug!(status = %response.status, "Payload response received");
        check_single_invoice(&response, &self.identity.user_id, accepted)
    }

    async fn verify_untampered(&self) -> Result<(), Violation> {
        let response = self
            .client
            .list_invoices(&self.identity, InvoiceFilter::unfiltered())
            .await?;
        check_untampered(&response)
    }

    async fn verify_collection_available(&self) -> Result<(), Violation> {
        let response = self
            .client
            .list_invoices(&self.identity, InvoiceFilter::unfiltered())
            .await?;
        check_collection_available(&response)
    }
}
