//! End-to-end browser tests using Playwright.
//!
//! These verify the engine's page scripts and formulas against a real
//! rendered page, not the scripted fake.
//!
//! ## Setup
//! Install Playwright browsers: `npx playwright install`
//!
//! ## Running
//! - Default (chromium): `cargo test --test e2e -- --ignored`
//! - Specific browser: `BROWSER=firefox cargo test --test e2e -- --ignored`

use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::Duration;

use playwright_rs::Playwright;
use tokio::sync::oneshot;

use a11yprobe::contrast;
use a11yprobe::metrics::METRICS_SCRIPT;
use a11yprobe::taborder::coverage_threshold;

/// A small page with known contrast pairs and a forward tab chain.
const FIXTURE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>a11yprobe fixture</title>
<style>
  body { margin: 0; background: rgb(255, 255, 255); }
  h1 { color: rgb(0, 0, 0); }
  p.fine-print { color: rgb(119, 119, 119); }
  a, button { display: inline-block; margin: 4px; }
</style>
</head>
<body>
<h1 id="headline">Welcome</h1>
<p class="fine-print">Terms apply.</p>
<nav>
  <a id="nav-home" href="#home">Home</a>
  <a id="nav-about" href="#about">About</a>
  <a id="nav-pricing" href="#pricing">Pricing</a>
</nav>
<button id="cta">Get started</button>
</body>
</html>
"##;

/// Find an available port for the test server.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// Write the fixture page to a temporary directory.
fn write_fixture() -> anyhow::Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let index = dir.path().join("index.html");
    fs::write(&index, FIXTURE_HTML)?;
    let root = dir.path().to_path_buf();
    Ok((dir, root))
}

/// Start a simple HTTP server serving static files.
async fn start_server(root: PathBuf, port: u16, shutdown_rx: oneshot::Receiver<()>) {
    use axum::Router;
    use tower_http::services::ServeDir;

    let app = Router::new().fallback_service(ServeDir::new(root));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .expect("Failed to bind server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .expect("Server error");
}

/// Get browsers to test based on BROWSER env var.
fn get_browsers_to_test() -> Vec<&'static str> {
    match std::env::var("BROWSER").as_deref() {
        Ok("firefox") => vec!["firefox"],
        Ok("webkit") => vec!["webkit"],
        Ok("all") => vec!["chromium", "firefox", "webkit"],
        _ => vec!["chromium"], // default
    }
}

fn resolved_color_expr(selector: &str, property: &str) -> String {
    format!(
        "window.getComputedStyle(document.querySelector('{selector}')).getPropertyValue('{property}')"
    )
}

/// Run the engine checks against the fixture with a specific browser.
async fn run_fixture_checks(playwright: &Playwright, browser_name: &str, base_url: &str) {
    println!("Testing with browser: {}", browser_name);

    let browser = match browser_name {
        "firefox" => playwright
            .firefox()
            .launch()
            .await
            .expect("Failed to launch Firefox"),
        "webkit" => playwright
            .webkit()
            .launch()
            .await
            .expect("Failed to launch WebKit"),
        _ => playwright
            .chromium()
            .launch()
            .await
            .expect("Failed to launch Chromium"),
    };

    let page = browser.new_page().await.expect("Failed to create page");

    let url = format!("{}/index.html", base_url);
    page.goto(&url, None)
        .await
        .expect("Failed to navigate to fixture page");

    // 1. Headline contrast: black on white must measure 21 and meet AA.
    let fg = page
        .evaluate_value(&resolved_color_expr("#headline", "color"))
        .await
        .expect("Failed to read headline color");
    let bg = page
        .evaluate_value(&resolved_color_expr("body", "background-color"))
        .await
        .expect("Failed to read body background");
    let ratio = contrast::contrast_ratio(&fg, &bg);
    assert!(
        (ratio - 21.0).abs() < 0.01,
        "[{}] headline contrast should be 21, got {} ({} on {})",
        browser_name,
        ratio,
        fg,
        bg
    );
    assert!(contrast::meets_ratio(&fg, &bg, contrast::AA_NORMAL_TEXT));

    // 2. Fine print: gray on white straddles the AA thresholds.
    let gray = page
        .evaluate_value(&resolved_color_expr("p.fine-print", "color"))
        .await
        .expect("Failed to read fine-print color");
    let gray_ratio = contrast::contrast_ratio(&gray, &bg);
    assert!(
        (gray_ratio - 4.48).abs() < 0.05,
        "[{}] fine-print contrast should be ~4.48, got {}",
        browser_name,
        gray_ratio
    );
    assert!(gray_ratio < contrast::AA_NORMAL_TEXT);
    assert!(gray_ratio > contrast::AA_LARGE_TEXT);

    // 3. The fixture's four focusable elements are all reachable, so full
    // coverage clears the size-dependent threshold.
    let focusables = page.locator("a[href], button").await;
    let count = focusables
        .count()
        .await
        .expect("Failed to count focusable elements");
    assert_eq!(count, 4, "[{}] fixture should have 4 focusable elements", browser_name);
    assert!(1.0 >= coverage_threshold(count as usize));

    // 4. The metrics script resolves within its budget on a page with no
    // input events; CLS comes back as a number.
    let metrics_probe = format!(
        "({})(1000).then((m) => JSON.stringify(m))",
        METRICS_SCRIPT
    );
    let mut resolved = false;
    for _ in 0..20 {
        let payload = page
            .evaluate_value(&metrics_probe)
            .await
            .unwrap_or_default();
        if payload.contains("cls") {
            resolved = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(
        resolved,
        "[{}] metrics script should resolve within its budget",
        browser_name
    );

    browser.close().await.expect("Failed to close browser");

    println!("[{}] All checks passed!", browser_name);
}

#[test]
#[ignore = "requires Playwright browsers (npx playwright install)"]
fn e2e_fixture_checks() -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let (_guard, root) = write_fixture()?;
        assert!(Path::new(&root).join("index.html").exists());
        let port = find_available_port();
        let base_url = format!("http://127.0.0.1:{}", port);

        // Start server
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server_handle = tokio::spawn(start_server(root, port, shutdown_rx));

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Initialize Playwright
        let playwright = Playwright::launch()
            .await
            .expect("Failed to initialize Playwright");

        for browser_name in get_browsers_to_test() {
            run_fixture_checks(&playwright, browser_name, &base_url).await;
        }

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;
        Ok(())
    })
}
