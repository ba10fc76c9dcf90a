use std::sync::Arc;

use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use stockfolio_core::errors::CoreError;
use stockfolio_core::models::holding::Holding;
use stockfolio_core::models::snapshot::Position;
use stockfolio_core::PortfolioTracker;

use crate::auth::AuthService;
use crate::error::{handle_rejection, reject};

// ── Wire DTOs ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
struct AccountResponse {
    id: Uuid,
    username: String,
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHoldingRequest {
    pub symbol: String,
    pub quantity: Decimal,
    pub buy_price: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HoldingResponse {
    id: Uuid,
    symbol: String,
    quantity: Decimal,
    buy_price: Decimal,
}

impl From<Holding> for HoldingResponse {
    fn from(h: Holding) -> Self {
        Self {
            id: h.id,
            symbol: h.symbol,
            quantity: h.quantity,
            buy_price: h.buy_price,
        }
    }
}

/// One row of `GET /api/portfolio`. `latest_price` is `null` when no source
/// could price the symbol — the value is absent, not zero.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionResponse {
    id: Uuid,
    symbol: String,
    quantity: Decimal,
    buy_price: Decimal,
    latest_price: Option<Decimal>,
}

impl From<Position> for PositionResponse {
    fn from(p: Position) -> Self {
        Self {
            id: p.holding.id,
            symbol: p.holding.symbol,
            quantity: p.holding.quantity,
            buy_price: p.holding.buy_price,
            latest_price: p.latest_price,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

// ── Routes ──────────────────────────────────────────────────────────

pub fn routes(tracker: Arc<PortfolioTracker>, auth: Arc<AuthService>) -> BoxedFilter<(Response,)> {
    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(with_auth_service(auth.clone()))
        .and(warp::body::json())
        .and_then(register_handler);

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(with_auth_service(auth.clone()))
        .and(warp::body::json())
        .and_then(login_handler);

    let list = warp::path!("api" / "portfolio")
        .and(warp::get())
        .and(with_identity(auth.clone()))
        .and(with_tracker(tracker.clone()))
        .and_then(list_portfolio_handler);

    let add = warp::path!("api" / "portfolio")
        .and(warp::post())
        .and(with_identity(auth.clone()))
        .and(with_tracker(tracker.clone()))
        .and(warp::body::json())
        .and_then(add_holding_handler);

    let delete = warp::path!("api" / "portfolio" / Uuid)
        .and(warp::delete())
        .and(with_identity(auth))
        .and(with_tracker(tracker.clone()))
        .and_then(delete_holding_handler);

    let search = warp::path!("api" / "stocks" / "search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(with_tracker(tracker))
        .and_then(search_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    register
        .or(login)
        .or(list)
        .or(add)
        .or(delete)
        .or(search)
        .recover(handle_rejection)
        .with(cors)
        .map(|reply| warp::reply::Reply::into_response(reply))
        .boxed()
}

fn with_tracker(
    tracker: Arc<PortfolioTracker>,
) -> impl Filter<Extract = (Arc<PortfolioTracker>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || tracker.clone())
}

fn with_auth_service(
    auth: Arc<AuthService>,
) -> impl Filter<Extract = (Arc<AuthService>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || auth.clone())
}

/// Extract the verified caller identity from the `Authorization` header.
/// Missing or invalid bearer tokens reject uniformly with 401.
fn with_identity(
    auth: Arc<AuthService>,
) -> impl Filter<Extract = (Uuid,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let auth = auth.clone();
        async move {
            let token = header
                .as_deref()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| reject(CoreError::Unauthorized("Missing bearer token".into())))?;
            auth.verify_token(token).map_err(reject)
        }
    })
}

// ── Handlers ────────────────────────────────────────────────────────

async fn register_handler(
    auth: Arc<AuthService>,
    req: RegisterRequest,
) -> Result<impl Reply, Rejection> {
    let account = auth
        .register(&req.username, &req.email, &req.password)
        .await
        .map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&AccountResponse {
            id: account.id,
            username: account.username,
            email: account.email,
        }),
        StatusCode::CREATED,
    ))
}

async fn login_handler(auth: Arc<AuthService>, req: LoginRequest) -> Result<impl Reply, Rejection> {
    let token = auth.login(&req.email, &req.password).await.map_err(reject)?;
    Ok(warp::reply::json(&TokenResponse { token }))
}

async fn list_portfolio_handler(
    owner_id: Uuid,
    tracker: Arc<PortfolioTracker>,
) -> Result<impl Reply, Rejection> {
    let snapshot = tracker.snapshot(owner_id).await.map_err(reject)?;
    debug!(
        "portfolio read for {owner_id}: invested {}, value {}, p/l {}",
        snapshot.total_investment, snapshot.current_value, snapshot.unrealized_pl
    );
    let rows: Vec<PositionResponse> = snapshot.positions.into_iter().map(Into::into).collect();
    Ok(warp::reply::json(&rows))
}

async fn add_holding_handler(
    owner_id: Uuid,
    tracker: Arc<PortfolioTracker>,
    req: AddHoldingRequest,
) -> Result<impl Reply, Rejection> {
    let holding = tracker
        .add_holding(owner_id, &req.symbol, req.quantity, req.buy_price)
        .await
        .map_err(reject)?;
    info!("holding {} ({}) added for {owner_id}", holding.id, holding.symbol);
    Ok(warp::reply::with_status(
        warp::reply::json(&HoldingResponse::from(holding)),
        StatusCode::CREATED,
    ))
}

async fn delete_holding_handler(
    id: Uuid,
    owner_id: Uuid,
    tracker: Arc<PortfolioTracker>,
) -> Result<impl Reply, Rejection> {
    tracker.remove_holding(owner_id, id).await.map_err(reject)?;
    info!("holding {id} removed for {owner_id}");
    Ok(StatusCode::NO_CONTENT)
}

async fn search_handler(
    query: SearchQuery,
    tracker: Arc<PortfolioTracker>,
) -> Result<impl Reply, Rejection> {
    let matches = tracker.search_symbols(&query.q).await;
    debug!("symbol search {:?} -> {} matches", query.q, matches.len());
    Ok(warp::reply::json(&matches))
}
