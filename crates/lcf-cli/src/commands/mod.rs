//! Command handler modules for lcf-cli.
//!
//! Shared argument groups live here; command logic lives in the submodules.

pub mod field;
pub mod invoice;

use anyhow::{bail, Result};
use clap::Args;
use lcf_schemas::{Amount, Identity, PaymentContext, Price};

/// Coordinates of one field rendering plus the payer.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    #[arg(long)]
    pub entity_type: String,
    #[arg(long)]
    pub bundle: String,
    #[arg(long)]
    pub entity: String,
    #[arg(long)]
    pub view_mode: String,
    #[arg(long)]
    pub field_name: String,

    /// Authenticated user id
    #[arg(long, conflicts_with_all = ["ip", "session"])]
    pub uid: Option<String>,
    /// Anonymous payer client IP (requires --session)
    #[arg(long, requires = "session")]
    pub ip: Option<String>,
    /// Anonymous payer session id (requires --ip)
    #[arg(long, requires = "ip")]
    pub session: Option<String>,

    /// Entity label used in the invoice description
    #[arg(long, default_value = "")]
    pub entity_label: String,
    /// Field label used in the invoice description
    #[arg(long, default_value = "")]
    pub field_label: String,
}

impl ContextArgs {
    pub fn into_context(self) -> Result<PaymentContext> {
        let identity = match (self.uid, self.ip, self.session) {
            (Some(uid), None, None) => Identity::user(uid),
            (None, Some(ip), Some(session)) => Identity::anonymous(ip, session),
            _ => bail!("identity required: pass --uid, or both --ip and --session"),
        };
        Ok(PaymentContext {
            entity_type: self.entity_type,
            bundle: self.bundle,
            entity: self.entity,
            view_mode: self.view_mode,
            field_name: self.field_name,
            identity,
            entity_label: self.entity_label,
            field_label: self.field_label,
        })
    }
}

/// Per-call price override; the configured price applies when absent.
#[derive(Args, Debug, Clone, Default)]
pub struct PriceArgs {
    /// Fixed amount, e.g. 5.00 (requires --currency)
    #[arg(long, requires = "currency", conflicts_with = "donation")]
    pub amount: Option<String>,
    #[arg(long, requires = "amount")]
    pub currency: Option<String>,
    /// Create priceless invoices
    #[arg(long, default_value_t = false)]
    pub donation: bool,
}

impl PriceArgs {
    pub fn price(&self) -> Result<Option<Price>> {
        if self.donation {
            return Ok(Some(Price::Donation));
        }
        match (&self.amount, &self.currency) {
            (Some(a), Some(c)) => {
                let amount = Amount::parse(a).map_err(|e| anyhow::anyhow!("invalid --amount: {e}"))?;
                Ok(Some(Price::fixed(amount, c.trim())))
            }
            _ => Ok(None),
        }
    }
}
