//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
//!
//! The Spgateway callbacks never show error details to the payer. Failures are logged, and the browser is sent to the
//! shop's error page (or the gateway is told `{"success": false}`).
use std::collections::HashMap;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use spg_engine::{
    offers::JournalBundleCondition,
    traits::{BasketManagement, BundleCatalog, CreditCloser, PaymentGatewayDatabase},
    SpgatewayCallbackApi,
};

use crate::{
    config::CallbackOptions,
    data_objects::{BenefitParams, CheckoutParams, CustomerPaymentResult, NotifyResponse},
    errors::ServerError,
    helpers::{form_fields, get_remote_ip, redirect_to},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

type CallbackForm = Option<web::Form<HashMap<String, String>>>;

fn log_callback(req: &HttpRequest, options: &CallbackOptions, callback: &str) {
    match get_remote_ip(req, options.use_x_forwarded_for, options.use_forwarded) {
        Some(ip) => info!("💻️ Received Spgateway {callback} callback from {ip}"),
        None => info!("💻️ Received Spgateway {callback} callback from an unknown address"),
    }
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/payment/spgateway/checkout/{basket_id}" impl PaymentGatewayDatabase, CreditCloser);
/// Freezes the basket and builds the encrypted parameters that the payer's browser must post to the gateway's payment
/// page (`payment_page_url` in the response).
pub async fn checkout<B, C>(
    path: web::Path<i64>,
    params: web::Query<CheckoutParams>,
    api: web::Data<SpgatewayCallbackApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    let basket_id = path.into_inner();
    debug!("💻️ Checkout request for basket {basket_id}");
    let email = params.into_inner().email;
    let parameters = api.processor().begin_checkout(basket_id, email.as_deref()).await.map_err(|e| {
        warn!("💻️ Could not start checkout for basket {basket_id}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(parameters))
}

//----------------------------------------------   Return  ----------------------------------------------------
route!(spgateway_return => Post "/payment/spgateway/return/" impl PaymentGatewayDatabase, CreditCloser);
/// The payer's browser lands here after paying. Redirects to the receipt page for the paid basket.
pub async fn spgateway_return<B, C>(
    req: HttpRequest,
    options: web::Data<CallbackOptions>,
    api: web::Data<SpgatewayCallbackApi<B, C>>,
    form: CallbackForm,
) -> HttpResponse
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    log_callback(&req, &options, "return");
    let form = form_fields(form);
    let result = if options.local_test_mode {
        api.process_notify(&form).await.map(|outcome| outcome.basket)
    } else {
        api.process_return(&form).await.map(|outcome| outcome.basket)
    };
    match result {
        Ok(basket) => redirect_to(&api.receipt_url(&basket)),
        Err(e) => {
            warn!("💻️ Spgateway return callback failed. {e}");
            redirect_to(&api.error_url())
        },
    }
}

//----------------------------------------------   Notify  ----------------------------------------------------
route!(spgateway_notify => Post "/payment/spgateway/notify/" impl PaymentGatewayDatabase, CreditCloser);
/// The gateway's server-to-server payment notification. This is the only callback that places orders (unless the
/// server runs in local test mode).
pub async fn spgateway_notify<B, C>(
    req: HttpRequest,
    options: web::Data<CallbackOptions>,
    api: web::Data<SpgatewayCallbackApi<B, C>>,
    form: CallbackForm,
) -> HttpResponse
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    log_callback(&req, &options, "notify");
    let form = form_fields(form);
    match api.process_notify(&form).await {
        Ok(outcome) if options.local_test_mode => redirect_to(&api.receipt_url(&outcome.basket)),
        Ok(outcome) => {
            info!("💻️ Order {} placed for basket {}", outcome.order.number, outcome.basket.id());
            HttpResponse::Ok().json(NotifyResponse::success())
        },
        Err(e) => {
            warn!("💻️ Spgateway notification failed. {e}");
            if options.local_test_mode {
                redirect_to(&api.error_url())
            } else {
                HttpResponse::Ok().json(NotifyResponse::failure())
            }
        },
    }
}

//----------------------------------------------   Customer  ----------------------------------------------------
route!(spgateway_customer => Post "/payment/spgateway/customer/" impl PaymentGatewayDatabase, CreditCloser);
/// Shows the payer the verified result of their payment, along with a summary of the basket.
pub async fn spgateway_customer<B, C>(
    req: HttpRequest,
    options: web::Data<CallbackOptions>,
    api: web::Data<SpgatewayCallbackApi<B, C>>,
    form: CallbackForm,
) -> HttpResponse
where
    B: PaymentGatewayDatabase,
    C: CreditCloser,
{
    log_callback(&req, &options, "customer");
    let form = form_fields(form);
    match api.process_return(&form).await {
        Ok(outcome) => HttpResponse::Ok().json(CustomerPaymentResult::new(outcome.response, &outcome.basket)),
        Err(e) => {
            warn!("💻️ Spgateway customer callback failed. {e}");
            redirect_to(&api.error_url())
        },
    }
}

//----------------------------------------------   Offers  ----------------------------------------------------
route!(bundle_eligibility => Get "/api/baskets/{basket_id}/journal_bundles/{uuid}" impl BasketManagement, BundleCatalog);
/// Reports whether the basket holds every product in the journal bundle, and which lines a bundle discount would
/// apply to. When a benefit is given in the query, the discount it gives on those lines is included.
pub async fn bundle_eligibility<B, K>(
    path: web::Path<(i64, String)>,
    params: web::Query<BenefitParams>,
    db: web::Data<B>,
    catalog: web::Data<K>,
) -> Result<HttpResponse, ServerError>
where
    B: BasketManagement,
    K: BundleCatalog,
{
    let (basket_id, uuid) = path.into_inner();
    debug!("💻️ Bundle eligibility request for basket {basket_id} and bundle {uuid}");
    let benefit = params.to_benefit().map_err(ServerError::InvalidRequestPath)?;
    let basket = db
        .fetch_basket(basket_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Basket {basket_id} does not exist")))?;
    let condition = JournalBundleCondition::new(&uuid);
    let eligibility = condition.evaluate_offer(catalog.get_ref(), &basket, benefit.as_ref()).await;
    Ok(HttpResponse::Ok().json(eligibility))
}
