use colored::Colorize;
use edgeplan_cloud::StateManager;
use edgeplan_cloud::state::DEFAULT_STATE_DIR;
use edgeplan_config::Settings;
use std::path::PathBuf;

pub async fn handle_list(settings: &Settings) -> anyhow::Result<()> {
    let state_dir = settings
        .state_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
    let state = StateManager::in_dir(state_dir.clone()).load().await?;

    if state.resources.is_empty() {
        println!("{}", "No resources recorded.".yellow());
        return Ok(());
    }

    println!(
        "{} ({})",
        "Recorded resources".bold(),
        state_dir.display()
    );
    for (address, resource) in &state.resources {
        println!(
            "  {} {} (updated {})",
            address.cyan(),
            resource.id,
            resource.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
