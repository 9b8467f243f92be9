use std::path::Path;

use navcase::surface::{NavSurface, SitePages};

use crate::FixArgs;
use crate::commands::{Loaded, ensure_site};

pub async fn run(args: &FixArgs, config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let site_dir = loaded.site_dir(args.path.as_deref());

    ensure_site(&site_dir)?;

    let fixer = loaded.config.fixer()?;
    let mut pages = SitePages::new(&site_dir, fixer).with_dry_run(args.dry_run);

    let report = tokio::task::spawn_blocking(move || pages.apply()).await??;

    if args.dry_run {
        println!("Dry run: {report}");
    } else {
        println!("Fixed {}: {report}", site_dir.display());
    }

    Ok(())
}
