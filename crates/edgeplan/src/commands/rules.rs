use crate::logging::log_multiline;
use anyhow::Context;
use colored::Colorize;
use edgeplan_property::{Rules, RulesBuilder, RulesUpdate};
use serde_json::Value;
use std::path::Path;
use tracing::Level;

/// Parse a rules file: `.yaml`/`.yml` as YAML, anything else as JSON
pub fn read_config(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let config: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?
    };
    Ok(config)
}

fn count_rules(rules: &Rules) -> usize {
    1 + rules.children.iter().map(count_rules).sum::<usize>()
}

pub fn handle_build(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let config = read_config(file)?;
    let rules = RulesBuilder::new(&config)?.build()?;
    let document = serde_json::to_string_pretty(&RulesUpdate {
        comments: None,
        rules,
    })?;
    log_multiline(Level::DEBUG, "rules: ", &document);

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", document))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} {}",
                "✓ Rule tree written to".green(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", document),
    }
    Ok(())
}

pub fn handle_validate(file: &Path) -> anyhow::Result<()> {
    println!("{}", "Validating rules...".blue());

    let config = read_config(file)?;
    let built = RulesBuilder::new(&config).and_then(|builder| {
        let rules = builder.build()?;
        Ok((builder.rule_format().to_string(), rules))
    });

    match built {
        Ok((format, rules)) => {
            println!("{}", "✓ Rules are valid".green().bold());
            println!();
            println!("Summary:");
            println!("  Rule format: {}", format.cyan());
            println!("  Root rule: {}", rules.name.cyan());
            println!("  Behaviors: {}", rules.behaviors.len());
            println!("  Rules in tree: {}", count_rules(&rules));
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Rules error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
