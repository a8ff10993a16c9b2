use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use crudkit::config::{Config, LogFormat};
use crudkit::middleware::{ErrorHandler, JwtAuth, ReportApiVersions, RequestId};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("crudkit={},actix_web=info", config.app.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(&config);

    tracing::info!("Starting Crudkit API");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Store backend: {:?}", config.app.store);

    let factory = web::Data::new(
        crudkit::build_factory(&config)
            .await
            .context("Failed to open the persisted store")?,
    );

    let jwt = config.jwt.clone();
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(factory.clone())
            .wrap(ErrorHandler)
            .wrap(JwtAuth::new(&jwt))
            .wrap(ReportApiVersions)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .route("/", web::get().to(index))
            .configure(crudkit::modules::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("Server terminated unexpectedly")
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "Crudkit API",
        "version": env!("CARGO_PKG_VERSION"),
        "api_versions": [crudkit::middleware::SUPPORTED_API_VERSIONS],
        "docs": "/swagger"
    }))
}
