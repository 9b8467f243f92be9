use std::path::Path;

use crate::commands::Loaded;

pub async fn run(config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let normalizer = loaded.config.normalizer()?;
    let dictionary = normalizer.dictionary();

    println!(
        "Checking {} terms ({} lookup keys, {:?} precedence)",
        dictionary.len(),
        dictionary.expanded().len(),
        normalizer.precedence()
    );

    let mismatches = normalizer.verify();
    if mismatches.is_empty() {
        println!("All terms resolve to their canonical values");
        return Ok(());
    }

    for mismatch in &mismatches {
        eprintln!("  {mismatch}");
    }

    Err(anyhow::anyhow!(
        "{count} spelling(s) do not resolve to their canonical value",
        count = mismatches.len()
    ))
}
