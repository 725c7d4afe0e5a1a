use actix_web::{middleware::Condition, middleware::Logger, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use todo_list_api::auth::ApiKeyMiddleware;
use todo_list_api::config::Config;
use todo_list_api::startup::{configure, cors, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let api_key = config.api_key.clone();
    if api_key.is_some() {
        log::info!("API key gate enabled");
    }

    log::info!("Starting todo-list-api server at {}", config.server_url());
    HttpServer::new(move || {
        let gate = ApiKeyMiddleware::new(api_key.as_deref().unwrap_or_default());
        App::new()
            .wrap(Condition::new(api_key.is_some(), gate))
            .wrap(cors())
            .wrap(Logger::default())
            .configure(configure(&state))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

async fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            log::info!("Connected to Postgres, migrations applied");
            Ok(AppState::postgres(&config.jwt_secret, pool)?)
        }
        None => {
            log::warn!("DATABASE_URL not set, using in-memory storage");
            Ok(AppState::in_memory(&config.jwt_secret)?)
        }
    }
}
