use std::error::Error;
use std::process;
use std::sync::Arc;

use checkout_service::config::AppConfig;
use checkout_service::domain::ports::PaymentGateway;
use checkout_service::infrastructure::HttpPaymentGateway;
use checkout_service::{build_server, create_pool, run_migrations, Services};
use dotenvy::dotenv;

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    if let Err(e) = run() {
        log::error!("Startup failed: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    run_migrations(&pool)?;

    // The blocking HTTP client owns its own runtime and must be built (and
    // finally dropped) outside the actix system.
    let gateway: Arc<dyn PaymentGateway> = Arc::new(HttpPaymentGateway::new(
        config.payment_url.as_str(),
        config.payment_timeout,
    )?);
    log::info!("Payment authority at {}", config.payment_url);

    let services = Services::new(pool, Arc::clone(&gateway));
    let (host, port) = (config.host, config.port);

    actix_web::rt::System::new().block_on(async move {
        log::info!("Starting server at http://{}:{}", host, port);
        build_server(services, &host, port)?.await
    })?;

    drop(gateway);
    Ok(())
}
