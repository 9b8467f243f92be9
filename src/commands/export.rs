use std::collections::BTreeMap;
use std::path::Path;

use crate::ExportArgs;
use crate::commands::Loaded;

pub async fn run(args: &ExportArgs, config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let dictionary = loaded.config.dictionary()?;

    let json = if args.expanded {
        let lookup: BTreeMap<String, &str> = dictionary.expanded().into_iter().collect();
        serde_json::to_string_pretty(&lookup)?
    } else {
        serde_json::to_string_pretty(dictionary.terms())?
    };

    println!("{json}");
    Ok(())
}
