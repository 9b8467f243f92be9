use std::path::Path;

use navcase::reactor::Reactor;
use navcase::surface::SitePages;
use navcase::watch::FileWatcher;

use crate::WatchArgs;
use crate::commands::{Loaded, ensure_site, shutdown_signal};

pub async fn run(args: &WatchArgs, config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let site_dir = loaded.site_dir(args.path.as_deref());
    ensure_site(&site_dir)?;

    let config = &loaded.config;
    let pages = SitePages::new(&site_dir, config.fixer()?);

    // Dropping the watcher stops it, so it lives until the reactor is done
    let (_watcher, mutations) = FileWatcher::new(&config.watch, &site_dir)?;

    let reactor = Reactor::new(pages, config.triggers.clone()).with_mutations(mutations);

    println!("Watching {} for changes...", site_dir.display());
    println!("Press Ctrl+C to stop\n");

    let stats = reactor.run_until(shutdown_signal()).await;

    println!(
        "\nStopped after {} run(s): {} label(s) rewritten, {} failed run(s)",
        stats.runs, stats.nodes_rewritten, stats.failures
    );

    Ok(())
}
