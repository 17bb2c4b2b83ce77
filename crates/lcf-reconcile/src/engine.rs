use std::collections::HashSet;
use std::sync::Arc;

use lcf_db::InvoiceLedger;
use lcf_gateway::InvoiceGateway;
use lcf_schemas::{CreateInvoiceRequest, PaymentContext, Price};

use crate::policy::{price_matches, suppresses_creation};
use crate::{Resolution, ResolveError};

/// Ledger-backed idempotency layer over a non-idempotent invoicing service.
///
/// Creation is at-least-once: two concurrent resolutions of one fingerprint
/// may both create an invoice and both append a ledger row. Later
/// resolutions see both rows and tolerate them.
#[derive(Clone)]
pub struct ReconciliationEngine {
    ledger: Arc<dyn InvoiceLedger>,
    gateway: Arc<dyn InvoiceGateway>,
    webhook_url: Option<String>,
    invoice_expiry_secs: Option<u64>,
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("gateway", &self.gateway.name())
            .field("webhook_url", &self.webhook_url)
            .field("invoice_expiry_secs", &self.invoice_expiry_secs)
            .finish()
    }
}

impl ReconciliationEngine {
    pub fn new(ledger: Arc<dyn InvoiceLedger>, gateway: Arc<dyn InvoiceGateway>) -> Self {
        Self {
            ledger,
            gateway,
            webhook_url: None,
            invoice_expiry_secs: None,
        }
    }

    /// Attach a payment-notification URL to every invoice this engine creates.
    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        self.webhook_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Forward an expiry (seconds) on every invoice this engine creates.
    pub fn with_invoice_expiry(mut self, secs: Option<u64>) -> Self {
        self.invoice_expiry_secs = secs;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn InvoiceGateway> {
        &self.gateway
    }

    /// Resolve the invoices relevant to rendering `ctx` at `price`.
    ///
    /// Existing invoices linked to the fingerprint are fetched oldest first;
    /// missing ones are skipped and price mismatches are dropped. A new
    /// invoice is created (and recorded) unless a surviving invoice is
    /// `Unpaid` or `Paid`; it is appended last.
    ///
    /// Any ledger or gateway failure aborts the whole call.
    pub async fn resolve_invoices(
        &self,
        ctx: &PaymentContext,
        price: &Price,
    ) -> Result<Resolution, ResolveError> {
        let fp = lcf_fingerprint::fingerprint(ctx);

        let ids = self.ledger.find_by_fingerprint(&fp).await.map_err(|e| {
            tracing::warn!(hash = %fp, error = %e, "ledger lookup failed");
            ResolveError::Storage(e)
        })?;
        tracing::debug!(hash = %fp, rows = ids.len(), "ledger rows for fingerprint");

        let mut invoices = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut need_create = true;

        for id in ids {
            if id.is_empty() || !seen.insert(id.clone()) {
                continue;
            }

            let fetched = self.gateway.fetch(&id).await.map_err(|e| {
                tracing::warn!(hash = %fp, invoice_id = %id, error = %e, "invoice fetch failed");
                ResolveError::Gateway(e)
            })?;

            let Some(invoice) = fetched else {
                tracing::debug!(hash = %fp, invoice_id = %id, "stale ledger row: invoice not found");
                continue;
            };

            if !price_matches(&invoice, price) {
                tracing::debug!(
                    hash = %fp,
                    invoice_id = %id,
                    amount = ?invoice.amount,
                    currency = ?invoice.currency,
                    "invoice price mismatch; excluded"
                );
                continue;
            }

            if suppresses_creation(&invoice) {
                need_create = false;
            }
            invoices.push(invoice);
        }

        if !need_create {
            return Ok(Resolution {
                fingerprint: fp,
                invoices,
                created: None,
            });
        }

        let mut req = CreateInvoiceRequest::new(
            ctx.description(),
            price,
            lcf_fingerprint::invoice_metadata(ctx, &fp),
        );
        req.expiry_secs = self.invoice_expiry_secs;
        req.webhook = self.webhook_url.clone();

        let invoice = self.gateway.create(&req).await.map_err(|e| {
            tracing::warn!(hash = %fp, gateway = self.gateway.name(), error = %e, "invoice create failed");
            ResolveError::Gateway(e)
        })?;

        // The invoice now exists at the service; if this write fails it is
        // orphaned and the next resolution creates another one.
        self.ledger.insert(&invoice.id, &fp).await.map_err(|e| {
            tracing::warn!(hash = %fp, invoice_id = %invoice.id, error = %e, "ledger insert failed");
            ResolveError::Storage(e)
        })?;

        tracing::info!(
            hash = %fp,
            invoice_id = %invoice.id,
            donation = price.is_donation(),
            "invoice created"
        );

        let created = Some(invoice.id.clone());
        if seen.insert(invoice.id.clone()) {
            invoices.push(invoice);
        }

        Ok(Resolution {
            fingerprint: fp,
            invoices,
            created,
        })
    }
}
