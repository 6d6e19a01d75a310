pub mod handlers;
pub mod responses;

use crate::{config::Config, orchestrator::Orchestrator};
use actix_web::{middleware, web, App, HttpServer};

pub use handlers::UploadSettings;

/// Registers the relay routes. Callers supply `Data<Orchestrator>` and
/// `Data<UploadSettings>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/process", web::post().to(handlers::process_image))
        .route("/status/{task_id}", web::get().to(handlers::task_status))
        .route("/cancel/{task_id}", web::post().to(handlers::cancel_task))
        .route("/account", web::get().to(handlers::account_status));
}

pub async fn run(config: &Config, orchestrator: Orchestrator) -> std::io::Result<()> {
    let orchestrator = web::Data::new(orchestrator);
    let settings = web::Data::new(UploadSettings {
        limit: config.upload_limit,
    });

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(orchestrator.clone())
            .app_data(settings.clone())
            .configure(configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
