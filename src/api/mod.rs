use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    Comparison, ModelPolicy, ScenarioInput, SpendingIncreaseScope, StateTaxBasis,
    compare_scenarios,
};
use crate::error::CalcError;
use crate::report::Report;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStateTaxBasis {
    Salary,
    HousingCost,
}

impl From<CliStateTaxBasis> for StateTaxBasis {
    fn from(value: CliStateTaxBasis) -> Self {
        match value {
            CliStateTaxBasis::Salary => StateTaxBasis::Salary,
            CliStateTaxBasis::HousingCost => StateTaxBasis::HousingCost,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliSpendingIncreaseScope {
    CommonExpenses,
    FullSubtotal,
}

impl From<CliSpendingIncreaseScope> for SpendingIncreaseScope {
    fn from(value: CliSpendingIncreaseScope) -> Self {
        match value {
            CliSpendingIncreaseScope::CommonExpenses => SpendingIncreaseScope::CommonExpenses,
            CliSpendingIncreaseScope::FullSubtotal => SpendingIncreaseScope::FullSubtotal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStateTaxBasis {
    Salary,
    #[serde(alias = "housingCost")]
    HousingCost,
}

impl From<ApiStateTaxBasis> for StateTaxBasis {
    fn from(value: ApiStateTaxBasis) -> Self {
        match value {
            ApiStateTaxBasis::Salary => StateTaxBasis::Salary,
            ApiStateTaxBasis::HousingCost => StateTaxBasis::HousingCost,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSpendingIncreaseScope {
    #[serde(alias = "commonExpenses")]
    CommonExpenses,
    #[serde(alias = "fullSubtotal")]
    FullSubtotal,
}

impl From<ApiSpendingIncreaseScope> for SpendingIncreaseScope {
    fn from(value: ApiSpendingIncreaseScope) -> Self {
        match value {
            ApiSpendingIncreaseScope::CommonExpenses => SpendingIncreaseScope::CommonExpenses,
            ApiSpendingIncreaseScope::FullSubtotal => SpendingIncreaseScope::FullSubtotal,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PolicyArgs {
    #[arg(
        long,
        value_enum,
        env = "MOVING_CALC_STATE_TAX_BASIS",
        default_value_t = CliStateTaxBasis::Salary,
        help = "Base for state income tax: salary, or house payment plus property tax"
    )]
    pub state_tax_basis: CliStateTaxBasis,
    #[arg(
        long,
        value_enum,
        env = "MOVING_CALC_SPENDING_SCOPE",
        default_value_t = CliSpendingIncreaseScope::CommonExpenses,
        help = "Whether the spending increase applies to common expenses only or the full subtotal"
    )]
    pub spending_increase_scope: CliSpendingIncreaseScope,
}

impl From<PolicyArgs> for ModelPolicy {
    fn from(value: PolicyArgs) -> Self {
        ModelPolicy {
            state_tax_basis: value.state_tax_basis.into(),
            spending_increase_scope: value.spending_increase_scope.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    #[arg(long, help = "Net annual salary today")]
    pub current_salary: Decimal,
    #[arg(long)]
    pub current_monthly_house_payment: Decimal,
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub current_annual_property_tax: Decimal,
    #[arg(long, default_value_t = Decimal::ZERO, help = "State income tax rate in percent")]
    pub current_state_tax_rate: Decimal,
    #[arg(
        long,
        default_value_t = Decimal::ZERO,
        help = "Monthly household and utility expenses"
    )]
    pub monthly_common_expenses: Decimal,
    #[arg(
        long,
        help = "Desired net annual salary after the move; state tax base under --state-tax-basis=salary, defaults to current-salary"
    )]
    pub new_salary: Option<Decimal>,
    #[arg(long)]
    pub new_monthly_house_payment: Decimal,
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub new_annual_property_tax: Decimal,
    #[arg(long, help = "State income tax rate in percent, defaults to current-state-tax-rate")]
    pub new_state_tax_rate: Option<Decimal>,
    #[arg(long, help = "Defaults to monthly-common-expenses")]
    pub new_monthly_common_expenses: Option<Decimal>,
    #[arg(
        long,
        default_value_t = Decimal::ZERO,
        help = "Expected increase in common expenses after the move, in percent"
    )]
    pub spending_increase_pct: Decimal,
    #[command(flatten)]
    pub policy: PolicyArgs,
    #[arg(long, help = "Write the report as JSON to this path")]
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    current_salary: Option<Decimal>,
    current_monthly_house_payment: Option<Decimal>,
    current_annual_property_tax: Option<Decimal>,
    current_state_tax_rate: Option<Decimal>,
    #[serde(alias = "currentMonthlyCommonExpenses")]
    monthly_common_expenses: Option<Decimal>,

    new_salary: Option<Decimal>,
    new_monthly_house_payment: Option<Decimal>,
    new_annual_property_tax: Option<Decimal>,
    new_state_tax_rate: Option<Decimal>,
    new_monthly_common_expenses: Option<Decimal>,
    #[serde(alias = "spendingIncreasePercentage")]
    spending_increase_pct: Option<Decimal>,

    state_tax_basis: Option<ApiStateTaxBasis>,
    spending_increase_scope: Option<ApiSpendingIncreaseScope>,
}

#[derive(Debug, Clone, Copy)]
pub struct CalculationRequest {
    pub current: ScenarioInput,
    pub new: ScenarioInput,
    pub policy: ModelPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    comparison: Comparison,
    report: Report,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone, Copy)]
struct AppState {
    default_policy: ModelPolicy,
}

pub fn build_request(args: &CalcArgs) -> Result<CalculationRequest, String> {
    let new_salary = args.new_salary.unwrap_or(args.current_salary);
    let new_state_tax_rate = args.new_state_tax_rate.unwrap_or(args.current_state_tax_rate);
    let new_monthly_common_expenses = args
        .new_monthly_common_expenses
        .unwrap_or(args.monthly_common_expenses);

    for (name, value) in [
        ("--current-salary", args.current_salary),
        (
            "--current-monthly-house-payment",
            args.current_monthly_house_payment,
        ),
        (
            "--current-annual-property-tax",
            args.current_annual_property_tax,
        ),
        ("--monthly-common-expenses", args.monthly_common_expenses),
        ("--new-salary", new_salary),
        ("--new-monthly-house-payment", args.new_monthly_house_payment),
        ("--new-annual-property-tax", args.new_annual_property_tax),
        ("--new-monthly-common-expenses", new_monthly_common_expenses),
    ] {
        if value < Decimal::ZERO {
            return Err(format!("{name} must be >= 0"));
        }
    }

    let hundred = Decimal::ONE_HUNDRED;
    for (name, rate) in [
        ("--current-state-tax-rate", args.current_state_tax_rate),
        ("--new-state-tax-rate", new_state_tax_rate),
        ("--spending-increase-pct", args.spending_increase_pct),
    ] {
        if rate < Decimal::ZERO || rate > hundred {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    let current = ScenarioInput::new(
        args.current_monthly_house_payment,
        args.current_annual_property_tax,
        args.current_state_tax_rate,
        args.monthly_common_expenses,
        Decimal::ZERO,
        args.current_salary,
    )
    .map_err(|e| e.to_string())?;
    let new = ScenarioInput::new(
        args.new_monthly_house_payment,
        args.new_annual_property_tax,
        new_state_tax_rate,
        new_monthly_common_expenses,
        args.spending_increase_pct,
        new_salary,
    )
    .map_err(|e| e.to_string())?;

    Ok(CalculationRequest {
        current,
        new,
        policy: args.policy.into(),
    })
}

pub fn run_calculation(request: &CalculationRequest) -> Result<(Comparison, Report), CalcError> {
    let comparison = compare_scenarios(&request.current, &request.new, request.policy)?;
    let report = Report::from_comparison(&comparison, request.policy);
    Ok((comparison, report))
}

pub async fn run_http_server(port: u16, default_policy: ModelPolicy) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState { default_policy });

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, ?default_policy, "moving-calc HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<CalculatePayload>,
) -> Response {
    calculate_handler_impl(state, payload)
}

async fn calculate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<CalculatePayload>,
) -> Response {
    calculate_handler_impl(state, payload)
}

fn calculate_handler_impl(state: AppState, payload: CalculatePayload) -> Response {
    let request = match api_request_from_payload(payload, state.default_policy) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected calculate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match run_calculation(&request) {
        Ok((comparison, report)) => {
            info!(
                required_new_salary = %comparison.raise.required_new_salary,
                "calculated required salary"
            );
            json_response(StatusCode::OK, CalculateResponse { comparison, report })
        }
        Err(err) => {
            warn!(error = %err, "calculation failed");
            err.into_response()
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn api_request_from_json(json: &str) -> Result<CalculationRequest, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload, ModelPolicy::default())
}

fn api_request_from_payload(
    payload: CalculatePayload,
    default_policy: ModelPolicy,
) -> Result<CalculationRequest, String> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_salary {
        args.current_salary = v;
    }
    if let Some(v) = payload.current_monthly_house_payment {
        args.current_monthly_house_payment = v;
    }
    if let Some(v) = payload.current_annual_property_tax {
        args.current_annual_property_tax = v;
    }
    if let Some(v) = payload.current_state_tax_rate {
        args.current_state_tax_rate = v;
    }
    if let Some(v) = payload.monthly_common_expenses {
        args.monthly_common_expenses = v;
    }

    args.new_salary = payload.new_salary;
    if let Some(v) = payload.new_monthly_house_payment {
        args.new_monthly_house_payment = v;
    }
    if let Some(v) = payload.new_annual_property_tax {
        args.new_annual_property_tax = v;
    }
    args.new_state_tax_rate = payload.new_state_tax_rate;
    args.new_monthly_common_expenses = payload.new_monthly_common_expenses;
    if let Some(v) = payload.spending_increase_pct {
        args.spending_increase_pct = v;
    }

    let mut request = build_request(&args)?;
    request.policy = ModelPolicy {
        state_tax_basis: payload
            .state_tax_basis
            .map(Into::into)
            .unwrap_or(default_policy.state_tax_basis),
        spending_increase_scope: payload
            .spending_increase_scope
            .map(Into::into)
            .unwrap_or(default_policy.spending_increase_scope),
    };
    Ok(request)
}

fn default_args_for_api() -> CalcArgs {
    CalcArgs {
        current_salary: dec!(80000),
        current_monthly_house_payment: dec!(2000),
        current_annual_property_tax: dec!(3000),
        current_state_tax_rate: dec!(5),
        monthly_common_expenses: dec!(800),
        new_salary: None,
        new_monthly_house_payment: dec!(2000),
        new_annual_property_tax: dec!(3000),
        new_state_tax_rate: None,
        new_monthly_common_expenses: None,
        spending_increase_pct: Decimal::ZERO,
        policy: PolicyArgs {
            state_tax_basis: CliStateTaxBasis::Salary,
            spending_increase_scope: CliSpendingIncreaseScope::CommonExpenses,
        },
        report_path: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Uri};
    use tower::ServiceExt;

    fn sample_args() -> CalcArgs {
        default_args_for_api()
    }

    fn decimal_at(value: &serde_json::Value) -> Decimal {
        value
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
    }

    fn app(default_policy: ModelPolicy) -> Router {
        router(AppState { default_policy })
    }

    async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.expect("router is infallible")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn build_request_defaults_new_scenario_to_current_values() {
        let mut args = sample_args();
        args.new_monthly_house_payment = dec!(2500);
        args.spending_increase_pct = dec!(10);

        let request = build_request(&args).expect("valid request");
        assert_eq!(request.current.spending_increase_pct(), Decimal::ZERO);
        assert_eq!(request.new.spending_increase_pct(), dec!(10));
        assert_eq!(request.new.salary(), dec!(80000));
        assert_eq!(request.new.state_tax_rate(), dec!(5));
        assert_eq!(request.new.monthly_common_expenses(), dec!(800));
        assert_eq!(request.new.monthly_house_payment(), dec!(2500));
    }

    #[test]
    fn build_request_rejects_negative_amounts() {
        let mut args = sample_args();
        args.new_annual_property_tax = dec!(-1);

        let err = build_request(&args).expect_err("must reject negative tax");
        assert!(err.contains("--new-annual-property-tax"));
    }

    #[test]
    fn build_request_rejects_out_of_range_rates() {
        let mut args = sample_args();
        args.spending_increase_pct = dec!(150);
        let err = build_request(&args).expect_err("must reject > 100");
        assert!(err.contains("--spending-increase-pct"));

        let mut args = sample_args();
        args.new_state_tax_rate = Some(dec!(-0.5));
        let err = build_request(&args).expect_err("must reject < 0");
        assert!(err.contains("--new-state-tax-rate"));
    }

    #[test]
    fn run_calculation_surfaces_zero_salary() {
        let mut args = sample_args();
        args.current_salary = Decimal::ZERO;

        let request = build_request(&args).expect("zero salary is a valid input");
        let err = run_calculation(&request).expect_err("must fail");
        assert_eq!(err, CalcError::DivisionByZero);
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "currentSalary": 90000,
          "currentMonthlyHousePayment": "1800.50",
          "currentAnnualPropertyTax": 2500,
          "currentStateTaxRate": 4.75,
          "currentMonthlyCommonExpenses": 700,
          "newSalary": 95000,
          "newMonthlyHousePayment": 2600,
          "newAnnualPropertyTax": 4100,
          "newStateTaxRate": 6,
          "spendingIncreasePercentage": 12.5,
          "stateTaxBasis": "housing-cost",
          "spendingIncreaseScope": "fullSubtotal"
        }"#;

        let request = api_request_from_json(json).expect("valid payload");
        assert_eq!(request.current.salary(), dec!(90000));
        assert_eq!(request.current.monthly_house_payment(), dec!(1800.50));
        assert_eq!(request.current.state_tax_rate(), dec!(4.75));
        assert_eq!(request.current.monthly_common_expenses(), dec!(700));
        assert_eq!(request.new.salary(), dec!(95000));
        assert_eq!(request.new.monthly_common_expenses(), dec!(700));
        assert_eq!(request.new.spending_increase_pct(), dec!(12.5));
        assert_eq!(request.policy.state_tax_basis, StateTaxBasis::HousingCost);
        assert_eq!(
            request.policy.spending_increase_scope,
            SpendingIncreaseScope::FullSubtotal
        );
    }

    #[test]
    fn api_request_from_json_uses_defaults_for_missing_fields() {
        let request = api_request_from_json("{}").expect("defaults are valid");
        assert_eq!(request.current.salary(), dec!(80000));
        assert_eq!(request.new.monthly_house_payment(), dec!(2000));
        assert_eq!(request.policy, ModelPolicy::default());
    }

    #[test]
    fn api_request_from_json_rejects_unknown_policy() {
        let err = api_request_from_json(r#"{"stateTaxBasis": "federal"}"#)
            .expect_err("unknown variant");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn payload_without_policy_uses_server_default() {
        let server_policy = ModelPolicy {
            state_tax_basis: StateTaxBasis::HousingCost,
            spending_increase_scope: SpendingIncreaseScope::FullSubtotal,
        };
        let request = api_request_from_payload(CalculatePayload::default(), server_policy)
            .expect("valid defaults");
        assert_eq!(request.policy, server_policy);
    }

    #[tokio::test]
    async fn calculate_handler_returns_report() {
        let payload = CalculatePayload {
            spending_increase_pct: Some(dec!(10)),
            ..CalculatePayload::default()
        };
        let response = calculate_handler_impl(
            AppState {
                default_policy: ModelPolicy::default(),
            },
            payload,
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert_eq!(
            decimal_at(&body["comparison"]["current"]["totalAnnualExpenses"]),
            dec!(40600)
        );
        assert_eq!(
            decimal_at(&body["comparison"]["raise"]["additionalExpenses"]),
            dec!(960)
        );
        assert_eq!(body["report"]["results"][3]["amount"], "$80,960.00");
        assert_eq!(
            body["report"]["categoryComparison"][0]["category"],
            "House Payment"
        );
    }

    #[tokio::test]
    async fn calculate_handler_reports_zero_salary_as_bad_request() {
        let payload = CalculatePayload {
            current_salary: Some(Decimal::ZERO),
            ..CalculatePayload::default()
        };
        let response = calculate_handler_impl(
            AppState {
                default_policy: ModelPolicy::default(),
            },
            payload,
        );

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "current salary cannot be zero");
    }

    #[tokio::test]
    async fn calculate_handler_rejects_negative_input() {
        let payload = CalculatePayload {
            new_monthly_house_payment: Some(dec!(-100)),
            ..CalculatePayload::default()
        };
        let response = calculate_handler_impl(
            AppState {
                default_policy: ModelPolicy::default(),
            },
            payload,
        );

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "--new-monthly-house-payment must be >= 0");
    }

    #[test]
    fn api_request_from_json_rejects_non_canonical_policy_names() {
        for json in [
            r#"{"stateTaxBasis": "housing"}"#,
            r#"{"stateTaxBasis": "housing_cost"}"#,
            r#"{"spendingIncreaseScope": "subtotal"}"#,
            r#"{"spendingIncreaseScope": "common"}"#,
        ] {
            let err = api_request_from_json(json).expect_err("unknown variant");
            assert!(err.contains("Invalid API JSON payload"), "{json}: {err}");
        }

        let request = api_request_from_json(
            r#"{"stateTaxBasis": "housingCost", "spendingIncreaseScope": "common-expenses"}"#,
        )
        .expect("camelCase alias and kebab-case name");
        assert_eq!(request.policy.state_tax_basis, StateTaxBasis::HousingCost);
        assert_eq!(
            request.policy.spending_increase_scope,
            SpendingIncreaseScope::CommonExpenses
        );
    }

    #[test]
    fn oversized_amount_is_rejected_by_calculation() {
        let request =
            api_request_from_json(r#"{"newMonthlyHousePayment": "79228162514264337593543950335"}"#)
                .expect("largest decimal is non-negative");
        assert_eq!(request.new.monthly_house_payment(), Decimal::MAX);

        let err = run_calculation(&request).expect_err("annual payment overflows");
        assert_eq!(
            err,
            CalcError::invalid("monthly_house_payment", "is too large")
        );
    }

    #[test]
    fn query_string_parses_into_payload() {
        let uri: Uri = "/api/calculate?currentSalary=90000&spendingIncreasePct=10&stateTaxBasis=housing-cost"
            .parse()
            .expect("valid uri");
        let Query(payload) = Query::<CalculatePayload>::try_from_uri(&uri).expect("valid query");

        assert_eq!(payload.current_salary, Some(dec!(90000)));
        assert_eq!(payload.spending_increase_pct, Some(dec!(10)));
        assert_eq!(payload.state_tax_basis, Some(ApiStateTaxBasis::HousingCost));
        assert!(payload.spending_increase_scope.is_none());
        assert!(payload.new_salary.is_none());
    }

    #[tokio::test]
    async fn get_calculate_uses_query_parameters() {
        let response = send(
            app(ModelPolicy::default()),
            get_request(
                "/api/calculate?currentSalary=90000&spendingIncreasePct=10&stateTaxBasis=housing-cost",
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            decimal_at(&body["comparison"]["current"]["annualStateTax"]),
            dec!(1350)
        );
        assert_eq!(
            decimal_at(&body["comparison"]["newInput"]["salary"]),
            dec!(90000)
        );
        assert_eq!(body["report"]["policy"]["stateTaxBasis"], "housing-cost");
    }

    #[tokio::test]
    async fn post_calculate_reads_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"spendingIncreasePct": 10}"#))
            .expect("valid request");

        let response = send(app(ModelPolicy::default()), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            decimal_at(&body["comparison"]["raise"]["additionalExpenses"]),
            dec!(960)
        );
    }

    #[tokio::test]
    async fn server_default_policy_applies_to_requests() {
        let policy = ModelPolicy {
            spending_increase_scope: SpendingIncreaseScope::FullSubtotal,
            ..ModelPolicy::default()
        };
        let response = send(
            app(policy),
            get_request("/api/calculate?spendingIncreasePct=10"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            decimal_at(&body["comparison"]["new"]["subtotalIncrease"]),
            dec!(4060)
        );
        assert_eq!(
            decimal_at(&body["comparison"]["new"]["annualCommonExpenses"]),
            dec!(9600)
        );
    }

    #[tokio::test]
    async fn oversized_amount_is_a_bad_request() {
        let response = send(
            app(ModelPolicy::default()),
            get_request("/api/calculate?newMonthlyHousePayment=79228162514264337593543950335"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid monthly_house_payment: is too large");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = send(app(ModelPolicy::default()), get_request("/api/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_not_found() {
        let response = send(app(ModelPolicy::default()), get_request("/api/unknown")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Not found" }));
    }
}
