//! `sunbae onboard` — First-time setup.

use std::path::Path;

use anyhow::Context;
use sunbae_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = super::config_file(config_path);

    println!("🎓 sunbae — First-Time Setup");
    println!("============================\n");

    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        println!("✅ Created config directory: {}", dir.display());
    }

    std::fs::write(&path, AppConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Created config.toml at: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Add api_key (or set OPENAI_API_KEY) for live replies");
    println!("   2. Map characters to assistants under [assistants]");
    println!("   3. Run: sunbae ask -C sunny \"안녕하세요\"\n");

    Ok(())
}
