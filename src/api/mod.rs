use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    DEFAULT_RETIREMENT_INFLATION_PCT, ProjectionParams, ProjectionResult, SustainabilityResult,
    assess_sustainability, project,
};
use crate::price::{
    COINGECKO_PRICE_URL, CachedPriceSource, CoinGeckoSource, DEFAULT_PRICE_CACHE_TTL,
    DEFAULT_PRICE_POLL_INTERVAL, PriceSource, PricePoller,
};

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Projects an ETF + bitcoin portfolio and checks whether it funds retirement"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run a single projection and print it as JSON.
    Project(ProjectionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "NESTEGG_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(long, env = "NESTEGG_PRICE_URL", default_value = COINGECKO_PRICE_URL)]
    pub price_url: String,
    #[arg(
        long,
        env = "NESTEGG_PRICE_TTL_SECS",
        default_value_t = DEFAULT_PRICE_CACHE_TTL.as_secs(),
        help = "How long a fetched price is served from cache"
    )]
    pub price_ttl_secs: u64,
    #[arg(
        long,
        env = "NESTEGG_POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_PRICE_POLL_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        help = "How often the background task refreshes the price"
    )]
    pub poll_interval_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    #[arg(long, default_value_t = 10000.0, help = "Starting ETF balance (EUR)")]
    pub initial_capital: f64,
    #[arg(long, default_value_t = 1000.0, help = "Monthly ETF savings (EUR)")]
    pub monthly_etf_contribution: f64,
    #[arg(long, default_value_t = 300.0, help = "Monthly bitcoin savings (EUR)")]
    pub monthly_growth_asset_contribution: f64,
    #[arg(long, default_value_t = 7.0, help = "Expected annual ETF return in percent")]
    pub etf_annual_return: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Expected annual bitcoin price growth in percent"
    )]
    pub growth_asset_annual_growth: f64,
    #[arg(long, default_value_t = 2.0, help = "Expected annual inflation in percent")]
    pub inflation_rate: f64,
    #[arg(long, default_value_t = 10, help = "Investment period in years")]
    pub years: u32,
    #[arg(long, default_value_t = 0.2, help = "Bitcoin already held")]
    pub growth_asset_units: f64,
    #[arg(
        long,
        help = "Bitcoin price in EUR; fetched from the price source when omitted"
    )]
    pub growth_asset_price: Option<f64>,
    #[arg(long, help = "Calendar year of the first row; defaults to the current year")]
    pub start_year: Option<i32>,
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(
        long,
        default_value_t = 50000.0,
        help = "Desired annual retirement income (EUR)"
    )]
    pub retirement_income: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_RETIREMENT_INFLATION_PCT,
        help = "Inflation applied to retirement withdrawals in percent"
    )]
    pub retirement_inflation: f64,
    #[arg(long, env = "NESTEGG_PRICE_URL", default_value = COINGECKO_PRICE_URL)]
    pub price_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_capital: Option<f64>,
    #[serde(alias = "monthlyETF", alias = "monthlyETFContribution")]
    monthly_etf_contribution: Option<f64>,
    #[serde(alias = "monthlyBTC")]
    monthly_growth_asset_contribution: Option<f64>,
    #[serde(alias = "etfReturn")]
    etf_annual_return_pct: Option<f64>,
    #[serde(alias = "btcGrowth")]
    growth_asset_annual_growth_pct: Option<f64>,
    #[serde(alias = "inflation")]
    annual_inflation_pct: Option<f64>,
    years: Option<u32>,
    #[serde(alias = "btcHodl")]
    initial_growth_asset_units: Option<f64>,
    #[serde(alias = "currentBTCPrice")]
    current_growth_asset_unit_price: Option<f64>,
    start_year: Option<i32>,
    current_age: Option<u32>,
    #[serde(alias = "retirementIncome")]
    desired_annual_income: Option<f64>,
    retirement_inflation_pct: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum PriceOrigin {
    Request,
    Fetched,
    Cached,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    unit_price: f64,
    price_origin: PriceOrigin,
    current_age: u32,
    retirement_age: u32,
    desired_annual_income: f64,
    projection: ProjectionResult,
    sustainability: SustainabilityResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    prices: Arc<CachedPriceSource<Arc<dyn PriceSource>>>,
    price_ttl: Duration,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>, price_ttl: Duration) -> Self {
        Self {
            prices: Arc::new(CachedPriceSource::new(source, price_ttl)),
            price_ttl,
        }
    }
}

fn check_retirement_args(args: &ProjectionArgs) -> Result<(), String> {
    if !args.retirement_income.is_finite() || args.retirement_income < 0.0 {
        return Err("desiredAnnualIncome must be >= 0".to_string());
    }
    if !args.retirement_inflation.is_finite() || args.retirement_inflation <= -100.0 {
        return Err("retirementInflationPct must be > -100".to_string());
    }
    Ok(())
}

fn build_params(
    args: &ProjectionArgs,
    unit_price: f64,
    current_year: i32,
) -> Result<ProjectionParams, String> {
    let params = ProjectionParams {
        initial_capital: args.initial_capital,
        monthly_etf_contribution: args.monthly_etf_contribution,
        monthly_growth_asset_contribution: args.monthly_growth_asset_contribution,
        etf_annual_return_pct: args.etf_annual_return,
        growth_asset_annual_growth_pct: args.growth_asset_annual_growth,
        annual_inflation_pct: args.inflation_rate,
        years: args.years,
        initial_growth_asset_units: args.growth_asset_units,
        current_growth_asset_unit_price: unit_price,
        start_year: args.start_year.unwrap_or(current_year),
    };
    params.validate().map_err(|e| e.to_string())?;
    Ok(params)
}

fn build_response(
    args: &ProjectionArgs,
    unit_price: f64,
    price_origin: PriceOrigin,
    current_year: i32,
) -> Result<ProjectResponse, String> {
    check_retirement_args(args)?;
    let params = build_params(args, unit_price, current_year)?;
    let projection = project(&params).map_err(|e| e.to_string())?;
    let sustainability = assess_sustainability(
        projection.total_value,
        args.retirement_income,
        args.retirement_inflation,
    );
    let retirement_age = args
        .current_age
        .checked_add(params.years)
        .ok_or_else(|| format!("currentAge must be <= {}", u32::MAX - params.years))?;

    Ok(ProjectResponse {
        unit_price,
        price_origin,
        current_age: args.current_age,
        retirement_age,
        desired_annual_income: args.retirement_income,
        projection,
        sustainability,
    })
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Runs one projection from command-line arguments and prints the JSON result.
pub async fn run_project_command(args: ProjectionArgs) -> Result<(), String> {
    check_retirement_args(&args)?;
    let (unit_price, origin) = match args.growth_asset_price {
        Some(price) => (price, PriceOrigin::Request),
        None => {
            let source = CoinGeckoSource::new(args.price_url.clone())
                .map_err(|e| format!("Could not set up the price client: {e}"))?;
            let price = source
                .fetch_price()
                .await
                .map_err(|e| format!("Could not fetch the bitcoin price: {e}"))?;
            (price, PriceOrigin::Fetched)
        }
    };

    let response = build_response(&args, unit_price, origin, current_year())?;
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("Could not encode the result: {e}"))?;
    println!("{json}");
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/price", get(price_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(args: ServeArgs) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let price_ttl = Duration::from_secs(args.price_ttl_secs);
    let coingecko = CoinGeckoSource::new(args.price_url.clone()).map_err(std::io::Error::other)?;
    let source: Arc<dyn PriceSource> = Arc::new(coingecko);
    let state = AppState::new(source, price_ttl);

    let poller = PricePoller::start(
        state.prices.clone(),
        Duration::from_secs(args.poll_interval_secs),
    );
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, price_url = %args.price_url, "nestegg HTTP API listening");

    let served = axum::serve(listener, app).await;
    poller.cancel();
    served
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn price_handler(State(state): State<AppState>) -> Response {
    match state.prices.quote().await {
        Ok(quote) => {
            let mut response = (StatusCode::OK, Json(quote)).into_response();
            let cache_control = format!("public, max-age={}", state.price_ttl.as_secs());
            if let Ok(value) = HeaderValue::from_str(&cache_control) {
                response.headers_mut().insert(header::CACHE_CONTROL, value);
            }
            response
        }
        Err(err) => {
            tracing::warn!(error = %err, "price request failed");
            error_response(StatusCode::BAD_GATEWAY, "Failed to fetch BTC price")
        }
    }
}

async fn project_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<ProjectPayload>,
) -> Response {
    project_handler_impl(&state, payload).await
}

async fn project_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProjectPayload>,
) -> Response {
    project_handler_impl(&state, payload).await
}

async fn project_handler_impl(state: &AppState, payload: ProjectPayload) -> Response {
    let args = args_from_payload(payload);
    if let Err(msg) = check_retirement_args(&args) {
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }

    let (unit_price, origin) = match args.growth_asset_price {
        Some(price) => (price, PriceOrigin::Request),
        None => match state.prices.quote().await {
            Ok(quote) if quote.cached => (quote.price, PriceOrigin::Cached),
            Ok(quote) => (quote.price, PriceOrigin::Fetched),
            Err(err) => {
                tracing::warn!(error = %err, "no price available for projection");
                return error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Bitcoin price unavailable; pass currentGrowthAssetUnitPrice to project offline",
                );
            }
        },
    };

    match build_response(&args, unit_price, origin, current_year()) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn args_from_json(json: &str) -> Result<ProjectionArgs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(args_from_payload(payload))
}

fn args_from_payload(payload: ProjectPayload) -> ProjectionArgs {
    let mut args = default_args_for_api();

    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_etf_contribution {
        args.monthly_etf_contribution = v;
    }
    if let Some(v) = payload.monthly_growth_asset_contribution {
        args.monthly_growth_asset_contribution = v;
    }
    if let Some(v) = payload.etf_annual_return_pct {
        args.etf_annual_return = v;
    }
    if let Some(v) = payload.growth_asset_annual_growth_pct {
        args.growth_asset_annual_growth = v;
    }
    if let Some(v) = payload.annual_inflation_pct {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.initial_growth_asset_units {
        args.growth_asset_units = v;
    }
    if let Some(v) = payload.current_growth_asset_unit_price {
        args.growth_asset_price = Some(v);
    }
    if let Some(v) = payload.start_year {
        args.start_year = Some(v);
    }
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.desired_annual_income {
        args.retirement_income = v;
    }
    if let Some(v) = payload.retirement_inflation_pct {
        args.retirement_inflation = v;
    }

    args
}

fn default_args_for_api() -> ProjectionArgs {
    ProjectionArgs {
        initial_capital: 10_000.0,
        monthly_etf_contribution: 1_000.0,
        monthly_growth_asset_contribution: 300.0,
        etf_annual_return: 7.0,
        growth_asset_annual_growth: 20.0,
        inflation_rate: 2.0,
        years: 10,
        growth_asset_units: 0.2,
        growth_asset_price: None,
        start_year: None,
        current_age: 30,
        retirement_income: 50_000.0,
        retirement_inflation: DEFAULT_RETIREMENT_INFLATION_PCT,
        price_url: COINGECKO_PRICE_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::testing::ScriptedSource;
    use clap::CommandFactory;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_args() -> ProjectionArgs {
        let mut args = default_args_for_api();
        args.growth_asset_price = Some(60_000.0);
        args.start_year = Some(2025);
        args
    }

    fn test_state(source: ScriptedSource) -> AppState {
        AppState::new(Arc::new(source), Duration::from_secs(900))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults_match_api_defaults() {
        let cli = Cli::try_parse_from(["nestegg", "project"]).expect("defaults parse");
        let Command::Project(args) = cli.command else {
            panic!("expected project command");
        };
        let defaults = default_args_for_api();
        assert_approx(args.initial_capital, defaults.initial_capital);
        assert_approx(args.monthly_etf_contribution, defaults.monthly_etf_contribution);
        assert_approx(
            args.monthly_growth_asset_contribution,
            defaults.monthly_growth_asset_contribution,
        );
        assert_approx(args.etf_annual_return, defaults.etf_annual_return);
        assert_approx(
            args.growth_asset_annual_growth,
            defaults.growth_asset_annual_growth,
        );
        assert_approx(args.inflation_rate, defaults.inflation_rate);
        assert_eq!(args.years, defaults.years);
        assert_approx(args.growth_asset_units, defaults.growth_asset_units);
        assert_eq!(args.current_age, defaults.current_age);
        assert_approx(args.retirement_income, defaults.retirement_income);
        assert_eq!(args.growth_asset_price, None);
    }

    #[test]
    fn args_from_json_parses_web_keys() {
        let json = r#"{
          "initialCapital": 25000,
          "monthlyEtfContribution": 800,
          "monthlyGrowthAssetContribution": 150,
          "etfAnnualReturnPct": 6.5,
          "growthAssetAnnualGrowthPct": 15,
          "annualInflationPct": 2.5,
          "years": 20,
          "initialGrowthAssetUnits": 0.5,
          "currentGrowthAssetUnitPrice": 58000,
          "startYear": 2026,
          "currentAge": 35,
          "desiredAnnualIncome": 40000,
          "retirementInflationPct": 3
        }"#;
        let args = args_from_json(json).expect("json should parse");

        assert_approx(args.initial_capital, 25_000.0);
        assert_approx(args.monthly_etf_contribution, 800.0);
        assert_approx(args.monthly_growth_asset_contribution, 150.0);
        assert_approx(args.etf_annual_return, 6.5);
        assert_approx(args.growth_asset_annual_growth, 15.0);
        assert_approx(args.inflation_rate, 2.5);
        assert_eq!(args.years, 20);
        assert_approx(args.growth_asset_units, 0.5);
        assert_eq!(args.growth_asset_price, Some(58_000.0));
        assert_eq!(args.start_year, Some(2026));
        assert_eq!(args.current_age, 35);
        assert_approx(args.retirement_income, 40_000.0);
        assert_approx(args.retirement_inflation, 3.0);
    }

    #[test]
    fn args_from_json_accepts_short_form_aliases() {
        let json = r#"{
          "monthlyETF": 500,
          "monthlyBTC": 100,
          "etfReturn": 5,
          "btcGrowth": 30,
          "inflation": 1.5,
          "btcHodl": 1.25,
          "retirementIncome": 36000
        }"#;
        let args = args_from_json(json).expect("json should parse");

        assert_approx(args.monthly_etf_contribution, 500.0);
        assert_approx(args.monthly_growth_asset_contribution, 100.0);
        assert_approx(args.etf_annual_return, 5.0);
        assert_approx(args.growth_asset_annual_growth, 30.0);
        assert_approx(args.inflation_rate, 1.5);
        assert_approx(args.growth_asset_units, 1.25);
        assert_approx(args.retirement_income, 36_000.0);
        assert_eq!(args.years, 10);
    }

    #[test]
    fn build_params_rejects_non_positive_price() {
        let args = sample_args();
        let err = build_params(&args, 0.0, 2025).expect_err("must reject zero price");
        assert!(err.contains("currentGrowthAssetUnitPrice"));
    }

    #[test]
    fn build_params_rejects_negative_contribution() {
        let mut args = sample_args();
        args.monthly_growth_asset_contribution = -10.0;
        let err = build_params(&args, 60_000.0, 2025).expect_err("must reject negative spend");
        assert!(err.contains("monthlyGrowthAssetContribution"));
    }

    #[test]
    fn build_params_defaults_start_year_to_current_year() {
        let mut args = sample_args();
        args.start_year = None;
        let params = build_params(&args, 60_000.0, 2031).expect("valid args");
        assert_eq!(params.start_year, 2031);
    }

    #[test]
    fn build_response_reports_retirement_age_and_sustainability() {
        let args = sample_args();
        let response =
            build_response(&args, 60_000.0, PriceOrigin::Request, 2025).expect("valid args");

        assert_eq!(response.retirement_age, 40);
        assert_eq!(response.projection.yearly_breakdown.len(), 11);
        assert_eq!(response.projection.yearly_breakdown[0].year, 2025);
        let expected = assess_sustainability(
            response.projection.total_value,
            args.retirement_income,
            DEFAULT_RETIREMENT_INFLATION_PCT,
        );
        assert_eq!(response.sustainability, expected);
    }

    #[test]
    fn build_response_rejects_negative_income() {
        let mut args = sample_args();
        args.retirement_income = -1.0;
        let err = build_response(&args, 60_000.0, PriceOrigin::Request, 2025)
            .expect_err("must reject negative income");
        assert!(err.contains("desiredAnnualIncome"));
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let response = build_response(&sample_args(), 60_000.0, PriceOrigin::Cached, 2025)
            .expect("valid args");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"priceOrigin\":\"cached\""));
        assert!(json.contains("\"retirementAge\""));
        assert!(json.contains("\"yearlyBreakdown\""));
        assert!(json.contains("\"growthAssetValue\""));
        assert!(json.contains("\"sustainableAnnualWithdrawal\""));
        assert!(json.contains("\"yearsUntilDepletion\""));
    }

    #[tokio::test]
    async fn project_handler_uses_fetched_price_when_none_given() {
        let state = test_state(ScriptedSource::new(64_000.0));
        let response = project_handler_impl(&state, ProjectPayload::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = body_json(response).await;
        assert_eq!(body["unitPrice"], 64_000.0);
        assert_eq!(body["priceOrigin"], "fetched");

        let again = project_handler_impl(&state, ProjectPayload::default()).await;
        let body = body_json(again).await;
        assert_eq!(body["priceOrigin"], "cached");
    }

    #[tokio::test]
    async fn project_handler_refuses_without_price() {
        let source = ScriptedSource::new(64_000.0);
        source.set_failing(true);
        let state = test_state(source);

        let response = project_handler_impl(&state, ProjectPayload::default()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert!(body.get("projection").is_none());
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn project_handler_prefers_price_from_request() {
        let source = ScriptedSource::new(64_000.0);
        source.set_failing(true);
        let state = test_state(source);

        let payload = ProjectPayload {
            current_growth_asset_unit_price: Some(55_000.0),
            ..ProjectPayload::default()
        };
        let response = project_handler_impl(&state, payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["priceOrigin"], "request");
        assert_eq!(state.prices.ttl().await, Duration::from_secs(900));
    }

    #[tokio::test]
    async fn project_handler_rejects_invalid_input() {
        let state = test_state(ScriptedSource::new(64_000.0));
        let payload = ProjectPayload {
            initial_capital: Some(-1.0),
            ..ProjectPayload::default()
        };
        let response = project_handler_impl(&state, payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains("initialCapital"));
    }

    #[test]
    fn build_response_rejects_age_past_u32_range() {
        let mut args = sample_args();
        args.current_age = u32::MAX;
        let err = build_response(&args, 60_000.0, PriceOrigin::Request, 2025)
            .expect_err("retirement age must fit");
        assert!(err.contains("currentAge"));

        args.current_age = u32::MAX - args.years;
        let response =
            build_response(&args, 60_000.0, PriceOrigin::Request, 2025).expect("edge age fits");
        assert_eq!(response.retirement_age, u32::MAX);
    }

    #[tokio::test]
    async fn project_handler_rejects_overflowing_age_and_year() {
        let state = test_state(ScriptedSource::new(64_000.0));
        let payload = ProjectPayload {
            current_age: Some(u32::MAX),
            current_growth_asset_unit_price: Some(60_000.0),
            ..ProjectPayload::default()
        };
        let response = project_handler_impl(&state, payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().expect("error message").contains("currentAge"));

        let payload = ProjectPayload {
            start_year: Some(i32::MAX),
            current_growth_asset_unit_price: Some(60_000.0),
            ..ProjectPayload::default()
        };
        let response = project_handler_impl(&state, payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().expect("error message").contains("startYear"));
    }

    #[tokio::test]
    async fn price_handler_reports_cache_state() {
        let state = test_state(ScriptedSource::new(61_000.0));

        let first = price_handler(State(state.clone())).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("public, max-age=900"))
        );
        let body = body_json(first).await;
        assert_eq!(body["price"], 61_000.0);
        assert_eq!(body["cached"], false);

        let second = body_json(price_handler(State(state)).await).await;
        assert_eq!(second["cached"], true);
        assert!(second["cacheAge"].as_f64().is_some());
    }

    #[tokio::test]
    async fn price_handler_maps_failures_to_bad_gateway() {
        let source = ScriptedSource::new(61_000.0);
        source.set_failing(true);
        let response = price_handler(State(test_state(source))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to fetch BTC price");
    }
}
