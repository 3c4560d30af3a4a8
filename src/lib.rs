pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use application::order_service::OrderService;
use domain::ports::PaymentGateway;
use handlers::cart::Carts;
use handlers::orders::Orders;
use handlers::ApiDoc;
use infrastructure::DieselStore;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type MigrationError = Box<dyn std::error::Error + Send + Sync>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Application services shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub carts: web::Data<Carts>,
    pub orders: web::Data<Orders>,
}

impl Services {
    pub fn new(pool: DbPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        let store = DieselStore::new(pool);
        Services {
            carts: web::Data::new(CartService::new(store.clone())),
            orders: web::Data::new(OrderService::new(store, gateway)),
        }
    }

    /// Register the services and the `/api/v1` routes on an app.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.carts.clone())
            .app_data(self.orders.clone())
            .service(
                web::scope("/api/v1")
                    .route("/cart", web::post().to(handlers::cart::merge_cart))
                    .route("/cart/{customer_id}", web::get().to(handlers::cart::get_cart))
                    .route(
                        "/cart/{customer_id}",
                        web::delete().to(handlers::cart::clear_cart),
                    )
                    .route("/payment", web::post().to(handlers::payment::place_order))
                    .route(
                        "/payment/{order_id}",
                        web::get().to(handlers::payment::get_payment),
                    )
                    .route("/orders/{order_id}", web::get().to(handlers::orders::get_order)),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    services: Services,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
