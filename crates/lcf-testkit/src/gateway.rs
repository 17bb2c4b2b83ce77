//! Deterministic fake invoicing service.
//!
//! Invoice ids are `inv-000001`, `inv-000002`, ... in creation order. Created
//! invoices start `Unpaid`; tests move them along with [`FakeGateway::set_status`]
//! or make them disappear with [`FakeGateway::remove`].

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use lcf_gateway::{GatewayError, InvoiceGateway};
use lcf_schemas::{CreateInvoiceRequest, Invoice, InvoiceStatus};

#[derive(Default)]
struct State {
    invoices: BTreeMap<String, Invoice>,
    next_id: u64,
    creates: Vec<CreateInvoiceRequest>,
    fetches: usize,
    fail_create: Option<GatewayError>,
    fail_fetch: Option<GatewayError>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Put an invoice straight into the service, e.g. one created "earlier".
    pub fn insert(&self, invoice: Invoice) {
        self.lock().invoices.insert(invoice.id.clone(), invoice);
    }

    pub fn invoice(&self, id: &str) -> Option<Invoice> {
        self.lock().invoices.get(id).cloned()
    }

    /// Change an invoice's status. Moving to `Paid` stamps `paid_at`.
    pub fn set_status(&self, id: &str, status: InvoiceStatus) -> bool {
        let mut st = self.lock();
        match st.invoices.get_mut(id) {
            Some(inv) => {
                if status == InvoiceStatus::Paid && inv.paid_at.is_none() {
                    inv.paid_at = Some(Utc::now());
                }
                inv.status = status;
                true
            }
            None => false,
        }
    }

    /// Forget an invoice; later fetches answer "not found".
    pub fn remove(&self, id: &str) -> Option<Invoice> {
        self.lock().invoices.remove(id)
    }

    pub fn create_count(&self) -> usize {
        self.lock().creates.len()
    }

    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    pub fn last_create(&self) -> Option<CreateInvoiceRequest> {
        self.lock().creates.last().cloned()
    }

    pub fn fail_create(&self, err: Option<GatewayError>) {
        self.lock().fail_create = err;
    }

    pub fn fail_fetch(&self, err: Option<GatewayError>) {
        self.lock().fail_fetch = err;
    }
}

#[async_trait]
impl InvoiceGateway for FakeGateway {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create(&self, req: &CreateInvoiceRequest) -> Result<Invoice, GatewayError> {
        let mut st = self.lock();
        if let Some(err) = &st.fail_create {
            return Err(err.clone());
        }
        st.next_id += 1;
        let id = format!("inv-{:06}", st.next_id);
        let now = Utc::now();
        let invoice = Invoice {
            id: id.clone(),
            amount: req.amount,
            currency: req.currency.clone(),
            status: InvoiceStatus::Unpaid,
            description: Some(req.description.clone()),
            payreq: Some(format!("lnfake{}", st.next_id)),
            msatoshi: None,
            expires_at: req.expiry_secs.and_then(|s| {
                let secs = i64::try_from(s).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
                now.checked_add_signed(Duration::seconds(secs))
            }),
            paid_at: None,
            metadata: req.metadata.clone(),
        };
        st.creates.push(req.clone());
        st.invoices.insert(id, invoice.clone());
        Ok(invoice)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Invoice>, GatewayError> {
        let mut st = self.lock();
        st.fetches += 1;
        if let Some(err) = &st.fail_fetch {
            return Err(err.clone());
        }
        Ok(st.invoices.get(id).cloned())
    }
}
