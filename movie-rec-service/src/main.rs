use axum::http::{HeaderValue, Request};
use axum::middleware::{from_fn, Next};
use movie_rec::{CompletionProvider, GenerationGateway, InMemoryContextStore, InMemoryUserRecords};
use movie_rec_service::config::Config;
use movie_rec_service::data::{load_catalog, load_reviews};
use movie_rec_service::handlers::{create_router, AppState};
use movie_rec_service::providers::{ensure_model_available, OllamaProvider, TogetherProvider};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "movie_rec_service=debug,movie_rec=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

/// Assembles the ordered provider chain: the configured primary first, and
/// when fallback is enabled, the other provider appended after it. Together
/// is only usable with an API key.
fn build_provider_chain(config: &Config, client: &reqwest::Client) -> Vec<Arc<dyn CompletionProvider>> {
    let ollama: Arc<dyn CompletionProvider> = Arc::new(OllamaProvider::new(
        client.clone(),
        config.ollama_url.clone(),
        config.ollama_model.clone(),
    ));
    let together: Option<Arc<dyn CompletionProvider>> =
        config.together_api_key.as_ref().map(|key| {
            Arc::new(TogetherProvider::new(
                client.clone(),
                config.together_api_url.clone(),
                key.clone(),
                config.together_model.clone(),
            )) as Arc<dyn CompletionProvider>
        });

    let mut chain: Vec<Arc<dyn CompletionProvider>> = Vec::new();
    match config.llm_provider.as_str() {
        "together" => {
            match together {
                Some(together) => chain.push(together),
                None => warn!("LLM_PROVIDER=together but TOGETHER_API_KEY is not set"),
            }
            if config.enable_fallback {
                chain.push(ollama);
            }
        }
        _ => {
            chain.push(ollama);
            if config.enable_fallback {
                if let Some(together) = together {
                    chain.push(together);
                }
            }
        }
    }
    chain
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env();
    info!(
        provider = %config.llm_provider,
        fallback = config.enable_fallback,
        "Starting movie recommendation service"
    );

    let catalog = Arc::new(load_catalog(&config.catalog_path)?);
    let reviews = Arc::new(load_reviews(&config.reviews_path)?);

    let client = reqwest::Client::new();
    let chain = build_provider_chain(&config, &client);
    let uses_ollama = chain.iter().any(|p| p.name() == "ollama");
    if uses_ollama {
        ensure_model_available(&client, &config.ollama_url, &config.ollama_model).await;
    }

    let state = AppState {
        catalog,
        reviews,
        gateway: Arc::new(GenerationGateway::new(chain)),
        contexts: Arc::new(InMemoryContextStore::new()),
        user_records: Arc::new(InMemoryUserRecords::new()),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(correlation_id_middleware));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
