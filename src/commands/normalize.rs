use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::NormalizeArgs;
use crate::commands::Loaded;

pub async fn run(args: &NormalizeArgs, config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let normalizer = loaded.config.normalizer()?;

    if !args.text.is_empty() {
        for text in &args.text {
            println!("{}", normalizer.normalize(text));
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        println!("{}", normalizer.normalize(&line));
    }

    Ok(())
}
