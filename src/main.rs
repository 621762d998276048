use smart_laundry::commands::run_custom_commands;
use smart_laundry::configuration::get_configuration;
use smart_laundry::startup::Application;
use smart_laundry::telemetry::{
    get_otel_subscriber, get_subscriber, init_subscriber, init_tracer_provider,
};

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    let configuration = get_configuration()?;
    let service_name = configuration.application.service_name.clone();

    let tracer_provider = match &configuration.application.otlp_endpoint {
        Some(endpoint) => {
            let provider = init_tracer_provider(&service_name, endpoint)?;
            let subscriber = get_otel_subscriber(
                service_name.clone(),
                "info".into(),
                std::io::stdout,
                &provider,
            );
            init_subscriber(subscriber);
            Some(provider)
        }
        None => {
            let subscriber = get_subscriber(service_name.clone(), "info".into(), std::io::stdout);
            init_subscriber(subscriber);
            None
        }
    };

    let args: Vec<String> = std::env::args().collect();
    let result = if args.len() > 1 {
        run_custom_commands(args).await
    } else {
        match Application::build(configuration).await {
            Ok(application) => application.run_until_stopped().await.map_err(Into::into),
            Err(e) => Err(e),
        }
    };

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to shut down tracer provider: {:?}", e);
        }
    }
    result
}
