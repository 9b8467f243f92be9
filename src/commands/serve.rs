use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use navcase::reactor::{PageEvent, Reactor};
use navcase::surface::{NavSurface, SitePages};
use navcase::watch::FileWatcher;
use tokio::sync::{broadcast, mpsc};
use tower_http::services::ServeDir;

use crate::ServeArgs;
use crate::commands::{Loaded, ensure_site, shutdown_signal};

/// Publish the path of every page request as a location change.
async fn publish_location(
    State(tx): State<broadcast::Sender<String>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_page_request(path) {
        tracing::debug!(path, "location change");
        // No receiver only means the reactor has stopped
        let _ = tx.send(path.to_string());
    }

    next.run(request).await
}

/// Whether a request path names a page rather than an asset.
fn is_page_request(path: &str) -> bool {
    if path.ends_with('/') {
        return true;
    }

    match Path::new(path).extension() {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"),
    }
}

pub async fn run(args: &ServeArgs, config_file: &Path) -> Result<(), anyhow::Error> {
    let loaded = Loaded::from_arg(config_file).await?;
    let site_dir = loaded.site_dir(None);
    ensure_site(&site_dir)?;

    let config = &loaded.config;

    // Fix the site once before serving anything
    println!("Fixing site...");
    let mut pages = SitePages::new(&site_dir, config.fixer()?);
    let (pages, report) = tokio::task::spawn_blocking(move || {
        let report = pages.apply();
        (pages, report)
    })
    .await?;
    println!("{}", report?);

    let (location_tx, _) = broadcast::channel::<String>(64);
    let (page_tx, page_rx) = mpsc::unbounded_channel();

    let mut reactor = Reactor::new(pages, config.triggers.clone())
        .with_page_events(page_rx)
        .with_location(&location_tx);

    let _watcher = match FileWatcher::new(&config.watch, &site_dir) {
        Ok((watcher, mutations)) => {
            println!("Watching for changes...");
            reactor = reactor.with_mutations(mutations);
            Some(watcher)
        }
        Err(e) => {
            eprintln!("Warning: Failed to start file watcher: {}", e);
            None
        }
    };

    let reactor_task = tokio::spawn(reactor.run_until(shutdown_signal()));
    let _ = page_tx.send(PageEvent::DomContentLoaded);

    // Create the static file server
    let serve_dir = ServeDir::new(&site_dir).append_index_html_on_directories(true);

    let app = Router::new()
        .fallback_service(serve_dir)
        .layer(middleware::from_fn_with_state(
            location_tx.clone(),
            publish_location,
        ));

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    // Determine the URL to display
    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let _ = page_tx.send(PageEvent::Load);

    println!("\nServing site at {}", url);
    println!("Press Ctrl+C to stop\n");

    // Open browser if requested
    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {}", e);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = reactor_task.await?;
    println!(
        "\nStopped after {} run(s): {} label(s) rewritten, {} failed run(s)",
        stats.runs, stats.nodes_rewritten, stats.failures
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_requests() {
        assert!(is_page_request("/"));
        assert!(is_page_request("/guides/setup/"));
        assert!(is_page_request("/guides/setup"));
        assert!(is_page_request("/guides/setup/index.html"));
        assert!(is_page_request("/404.HTM"));
    }

    #[test]
    fn test_asset_requests() {
        assert!(!is_page_request("/assets/stylesheets/main.css"));
        assert!(!is_page_request("/assets/javascripts/bundle.js"));
        assert!(!is_page_request("/search/search_index.json"));
    }
}
