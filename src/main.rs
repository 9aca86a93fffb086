use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use buymeadrink_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{EmailService, StripeService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.auth).expect("Invalid auth configuration");

    let stripe_service = StripeService::new(config.stripe.clone());
    let email_service = EmailService::new(config.email.clone());
    if !email_service.is_enabled() {
        log::warn!("Email delivery is disabled; notifications will only be logged");
    }

    let notification_service = NotificationService::new(email_service, config.app.clone());
    let earnings_service = EarningsService::new(pool.clone());
    let creator_service = CreatorService::new(pool.clone(), notification_service.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let profile_service = ProfileService::new(pool.clone());
    let leaderboard_service = LeaderboardService::new(pool.clone());
    let order_service = OrderService::new(pool.clone());
    let checkout_service = CheckoutService::new(
        pool.clone(),
        notification_service.clone(),
        config.app.frontend_url.clone(),
    );
    let payout_service = PayoutService::new(
        pool.clone(),
        earnings_service.clone(),
        notification_service,
    );

    tasks::spawn_all(payout_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let frontend_url = config.app.frontend_url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&frontend_url))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(stripe_service.clone()))
            .app_data(web::Data::new(creator_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(leaderboard_service.clone()))
            .app_data(web::Data::new(earnings_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(payout_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::profile_config)
                    .configure(handlers::creator_config)
                    .configure(handlers::dashboard_config)
                    .configure(handlers::catalog_config)
                    .configure(handlers::checkout_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
