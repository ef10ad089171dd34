//! `sunbae doctor` — Diagnose configuration and datasets.

use std::path::Path;

use sunbae_config::AppConfig;
use sunbae_knowledge::DatasetStore;

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("🩺 sunbae Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let path = super::config_file(config_path);
    if !path.exists() {
        println!("  ⚠️  No config file at {} — using defaults (run `sunbae onboard`)", path.display());
        issues += 1;
    }

    let config = match AppConfig::load_with_env(&path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config file and re-run doctor.");
            return Ok(());
        }
    };

    match sunbae_providers::build_from_config(&config) {
        Some(remote) => {
            println!("  ✅ API key configured ({})", config.api_url);
            match remote.completions.health_check().await {
                Ok(true) => println!("  ✅ API reachable"),
                Ok(false) => {
                    println!("  ❌ API rejected the key or is unavailable");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ API unreachable: {e}");
                    issues += 1;
                }
            }
        }
        None => {
            println!("  ⚠️  No API key — chat replies will be offline canned text");
            issues += 1;
        }
    }

    match DatasetStore::from_config(&config.datasets) {
        Ok(store) => {
            let years = store.years();
            let events: usize = years
                .iter()
                .filter_map(|year| store.events_for_year(year).ok())
                .map(<[_]>::len)
                .sum();
            println!(
                "  ✅ Calendar: {} year(s), {events} event(s), {} holiday(s)",
                years.len(),
                store.holidays().len()
            );
            println!(
                "  ✅ Library: {} book(s), {} recommendation set(s)",
                store.all_books().len(),
                store.recommendation_sets().len()
            );
            if store.events_for_year(&config.default_year).is_err() {
                println!("  ❌ default_year {} is not in the calendar", config.default_year);
                issues += 1;
            }

            println!("\n  Assistants:");
            for character in store.characters() {
                match config.assistant_for(&character.id) {
                    Some(assistant) => println!("    ✅ {} ({}) → {assistant}", character.name, character.id),
                    None => println!("    ⚠️  {} ({}) → NOT_SET", character.name, character.id),
                }
            }
        }
        Err(e) => {
            println!("  ❌ Datasets failed to load: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
