use settle_browser::{AdminActions, ChromiumDriver, LaunchOptions, Locator, WaitConfig};
use settle_storage::DirArtifactStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // SETTLE_BASE_URL=http://magento.test SETTLE_SECRET_ADMIN_PASSWORD=... cargo run --example admin_login
    let config = WaitConfig::from_env()?;
    let driver = ChromiumDriver::launch(LaunchOptions::default()).await?;
    let artifacts = Arc::new(DirArtifactStore::new("artifacts")?);
    let admin = AdminActions::new(driver, config).with_artifacts(artifacts);

    admin.step("open admin", admin.open_page("/admin")).await?;
    admin.fill_field(&Locator::css("#username"), "admin").await?;
    admin.fill_secret_field(&Locator::css("#login"), "admin/password").await?;
    admin.step("sign in", admin.click(&Locator::css(".actions .action-login"))).await?;

    let report = admin.step("dashboard", admin.wait_for_page_load(None)).await?;
    println!("dashboard stable after {:?}", report.elapsed);

    admin.step(
        "filter products by website",
        admin.search_and_multi_select_option("[data-index='website_ids']", &["Main Website"], true),
    ).await?;

    Ok(())
}
