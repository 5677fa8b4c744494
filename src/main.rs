use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod ledger;

use ledger::{Ledger, Wallet};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine,
        api::handlers::validate_chain,
        api::handlers::get_balance,
        api::handlers::create_wallet
    ),
    components(
        schemas(
            ledger::Block,
            ledger::Transaction,
            ledger::Address,
            ledger::DigitalSignature,
            api::schema::DateTimeUtc,
            api::handlers::ChainResponse,
            api::handlers::TransactionRequest,
            api::handlers::TransactionResponse,
            api::handlers::MineResponse,
            api::handlers::WalletResponse,
            api::handlers::BalanceResponse
        )
    ),
    tags(
        (name = "ledger", description = "Proof-of-work ledger API endpoints")
    ),
    info(
        title = "Mini Ledger API",
        version = "1.0.0",
        description = "A minimal proof-of-work ledger API",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // The node's own wallet; mining rewards are credited to its address
    let node_wallet = Wallet::new();

    let ledger = web::Data::new(Ledger::new(node_wallet.address().clone()));
    let shutdown_ledger = ledger.clone();
    info!("Ledger address: {}", ledger.address());

    info!("Starting HTTP server at http://127.0.0.1:8080");

    let result = HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // Configure OpenAPI documentation
        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(ledger.clone())
            // API routes
            .configure(api::configure_routes)
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await;

    // A nonce search still in flight when the server stops must terminate
    shutdown_ledger.cancel_mining();

    result
}
