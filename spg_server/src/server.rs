use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use journal_tools::JournalApi;
use log::*;
use spg_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    SpgatewayCallbackApi,
    SpgatewayProcessor,
    SqliteDatabase,
};
use spgateway_tools::CreditCloseClient;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        BundleEligibilityRoute,
        CheckoutRoute,
        SpgatewayCustomerRoute,
        SpgatewayNotifyRoute,
        SpgatewayReturnRoute,
    },
};

/// CreditClose calls are made while the gateway waits for our reply to its notification, so keep them short.
const CREDIT_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Order events are only logged for now. Anything else that wants to know about placed or refunded orders hooks in
/// here.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_placed(|ev| {
        Box::pin(async move {
            info!(
                "📬️ Order {} placed. {} {} paid by {} ({})",
                ev.order.number, ev.order.total_incl_tax, ev.order.currency, ev.card_type, ev.transaction_id
            );
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_order_refunded(|ev| {
        Box::pin(async move {
            info!("📬️ Order {} refunded {} (ref {})", ev.order.number, ev.amount, ev.reference);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let closer = CreditCloseClient::new(&config.processor.gateway, CREDIT_CLOSE_TIMEOUT)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let journal_api =
        JournalApi::new(config.journal_api.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let processor = SpgatewayProcessor::new(db.clone(), closer, config.processor.clone(), producers);
    let callback_api = web::Data::new(SpgatewayCallbackApi::new(processor));
    let journal_api = web::Data::new(journal_api);
    let db = web::Data::new(db);
    let options = web::Data::new(config.callback_options());
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(callback_api.clone())
            .app_data(journal_api.clone())
            .app_data(db.clone())
            .app_data(options.clone())
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase, CreditCloseClient>::new())
            .service(SpgatewayReturnRoute::<SqliteDatabase, CreditCloseClient>::new())
            .service(SpgatewayNotifyRoute::<SqliteDatabase, CreditCloseClient>::new())
            .service(SpgatewayCustomerRoute::<SqliteDatabase, CreditCloseClient>::new())
            .service(BundleEligibilityRoute::<SqliteDatabase, JournalApi>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
