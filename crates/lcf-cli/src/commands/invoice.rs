use anyhow::{Context, Result};
use lcf_daemon::boot;
use lcf_gateway::InvoiceGateway;
use lcf_render::replace_command_for;

/// Fetch one invoice from Lightning Charge and print it as JSON.
pub async fn show(config_paths: &[String], id: &str) -> Result<()> {
    let config_paths = boot::resolve_config_paths(config_paths);
    let loaded = boot::load_config(&config_paths)?;
    let settings = loaded.settings()?;
    let gateway = boot::gateway_client(&settings.gateway)?;

    let invoice = gateway
        .fetch(id)
        .await
        .with_context(|| format!("fetch invoice {id} failed"))?;

    match invoice {
        Some(inv) => {
            let out = serde_json::json!({
                "invoice": inv,
                "fingerprint": inv.fingerprint(),
                "replace": replace_command_for(&inv),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        None => println!("found=false invoice_id={id}"),
    }
    Ok(())
}
