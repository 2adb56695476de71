//! `relaychat endpoint [url]`: show or change the relay endpoint.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn endpoint(state: &AppState, url: Option<&str>, json: bool) -> Result<()> {
    let mut controller = state.controller().await?;

    if let Some(url) = url {
        controller.update_endpoint(url).await?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "endpoint": controller.endpoint(),
                "updated": url.is_some(),
            }))?
        );
        return Ok(());
    }

    println!();
    if url.is_some() {
        println!(
            "  {} Endpoint set to {}",
            style("✓").green().bold(),
            style(controller.endpoint()).cyan()
        );
    } else {
        println!(
            "  {}  {}",
            style("Endpoint:").bold(),
            style(controller.endpoint()).cyan()
        );
    }
    println!();
    Ok(())
}
