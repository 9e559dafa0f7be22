use anyhow::Result;
use growlab_auth::GateView;
use growlab_core::Config;
use growlab_ui::AppServices;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    growlab_core::init()?;

    // Warnings are logged and invalid settings rejected while loading
    let (config, _) = Config::load_validated()?;

    let services = AppServices::new(config, tokio::runtime::Handle::current())?;

    // Optional start path, e.g. `growlab /calendar`
    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    services.navigate(&path);
    let outcome = services.auth_provider().validate().await;
    tracing::info!(?outcome, "initial session check");

    let page = services.current_page();
    let (sign_in_url, _) = services.sign_in().authorization_url();

    println!("GrowLab client");
    println!("\nConfiguration:");
    println!("  Config directory: {}", services.config().config_dir.display());
    println!("  Backend:          {}", services.config().api.base_url);
    println!("\nRoute:");
    println!("  Requested: {}", path);
    println!("  Current:   {} ({})", services.router().current_path(), page.title);
    println!("  Robots:    {}", page.robots.content());
    match services.auth_provider().view() {
        GateView::Render {
            is_authenticated: true,
        } => {
            let email = services.users().user().map(|u| u.email).unwrap_or_default();
            println!("  Signed in as {}", email);
        }
        GateView::Render {
            is_authenticated: false,
        } => println!("  Not signed in. Sign in at:\n  {}", sign_in_url),
        GateView::Hidden | GateView::Loading => println!("  Redirecting..."),
    }
    for alert in services.alerts().alerts() {
        println!("  [{:?}] {}", alert.kind, alert.message);
    }

    // Graceful shutdown
    services.shutdown().await;

    Ok(())
}
