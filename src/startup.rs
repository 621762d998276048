use crate::configuration::{OtpSettings, Settings};
use crate::database::get_connection_pool;
use crate::routes::main_route;
use crate::routes::order::transition::OrderTransitionService;
use crate::routes::order::utils::PgOrderRepository;
use crate::sms_client::{create_sms_client, GenericSmsService};

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database);
        let sms_client = create_sms_client(&configuration.sms)?;
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        tracing::info!("Listening on {}:{}", configuration.application.host, port);
        let server = run(
            listener,
            connection_pool,
            sms_client,
            configuration.otp,
            configuration.application.workers,
        )
        .await?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // Only returns when the application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

async fn run(
    listener: TcpListener,
    db_pool: PgPool,
    sms_client: Arc<dyn GenericSmsService>,
    otp_settings: OtpSettings,
    workers: usize,
) -> Result<Server, anyhow::Error> {
    let repository = Arc::new(PgOrderRepository::new(db_pool));
    let transition_service = web::Data::new(OrderTransitionService::new(
        repository,
        sms_client,
        otp_settings,
    ));
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(transition_service.clone())
            .configure(main_route)
    })
    .workers(workers)
    .listen(listener)?
    .run();

    Ok(server)
}
