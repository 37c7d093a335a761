use crate::infra::{ApiContext, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use ba7ath::error::AppError;
use ba7ath::registry::{
    load_dataset, ActivityCount, ActivityGroup, CompanyRecord, CompanyType, Wilaya,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const DEFAULT_COMPANY_LIMIT: usize = 50;

pub(crate) fn api_router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/api/v1/risk/wilayas", get(list_risks))
        .route("/api/v1/risk/wilayas/:name", get(read_risk))
        .route("/api/v1/stats/national", get(national_stats))
        .route("/api/v1/stats/wilayas/:name", get(wilaya_stats))
        .route("/api/v1/companies", get(list_companies))
        .route("/api/v1/companies/:id", get(read_company))
        .route("/api/v1/meta/methodology", get(methodology))
        .route("/api/v1/meta/sources", get(sources))
        .route("/api/v1/dataset/refresh", post(refresh_dataset))
        .with_state(ctx)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// All 24 profiles, already rank-ordered by the board.
pub(crate) async fn list_risks(State(ctx): State<Arc<ApiContext>>) -> Response {
    let board = ctx.store.current();
    (StatusCode::OK, Json(board.ranked.clone())).into_response()
}

pub(crate) async fn read_risk(
    State(ctx): State<Arc<ApiContext>>,
    Path(name): Path<String>,
) -> Response {
    let Some(wilaya) = Wilaya::parse(&name) else {
        return unknown_wilaya(&name);
    };

    let board = ctx.store.current();
    match board.ranked_for(wilaya) {
        Some(entry) => (StatusCode::OK, Json(entry.clone())).into_response(),
        // The board always covers the full set; a miss means the board
        // is still being built for this wilaya.
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no profile computed for '{wilaya}'") })),
        )
            .into_response(),
    }
}

pub(crate) async fn national_stats(State(ctx): State<Arc<ApiContext>>) -> Response {
    let board = ctx.store.current();
    (StatusCode::OK, Json(board.national.clone())).into_response()
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WilayaStatsView {
    pub(crate) wilaya: Wilaya,
    pub(crate) count: usize,
    pub(crate) pct_national: f64,
    pub(crate) rank: usize,
    pub(crate) types: BTreeMap<CompanyType, usize>,
    pub(crate) top_groups: BTreeMap<ActivityGroup, usize>,
    pub(crate) top_activities: Vec<ActivityCount>,
}

pub(crate) async fn wilaya_stats(
    State(ctx): State<Arc<ApiContext>>,
    Path(name): Path<String>,
) -> Response {
    let Some(wilaya) = Wilaya::parse(&name) else {
        return unknown_wilaya(&name);
    };

    let board = ctx.store.current();
    let Some(aggregate) = board.aggregate_for(wilaya) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no aggregate computed for '{wilaya}'") })),
        )
            .into_response();
    };

    let national_total = board.national.total;
    let pct_national = if national_total == 0 {
        0.0
    } else {
        round1(aggregate.total as f64 / national_total as f64 * 100.0)
    };

    let view = WilayaStatsView {
        wilaya,
        count: aggregate.total,
        pct_national,
        rank: board.count_rank(wilaya),
        types: aggregate.types.clone(),
        top_groups: aggregate.top_groups.clone(),
        top_activities: aggregate.top_activities.clone(),
    };

    (StatusCode::OK, Json(view)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompanyQuery {
    pub(crate) wilaya: Option<String>,
    pub(crate) group: Option<String>,
    #[serde(rename = "type")]
    pub(crate) company_type: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn list_companies(
    State(ctx): State<Arc<ApiContext>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let wilaya = match query.wilaya.as_deref() {
        Some(raw) => match Wilaya::parse(raw) {
            Some(wilaya) => Some(wilaya),
            None => return bad_filter("wilaya", raw),
        },
        None => None,
    };
    let group = match query.group.as_deref() {
        Some(raw) => match ActivityGroup::parse_code(raw) {
            Some(group) => Some(group),
            None => return bad_filter("group", raw),
        },
        None => None,
    };
    let company_type = match query.company_type.as_deref() {
        Some(raw) => match CompanyType::parse(raw) {
            Some(company_type) => Some(company_type),
            None => return bad_filter("type", raw),
        },
        None => None,
    };

    let limit = query.limit.unwrap_or(DEFAULT_COMPANY_LIMIT);
    let board = ctx.store.current();
    let companies: Vec<CompanyRecord> = board
        .snapshot
        .companies
        .iter()
        .filter(|record| wilaya.map_or(true, |wilaya| record.wilaya == wilaya))
        .filter(|record| group.map_or(true, |group| record.activity_group == group))
        .filter(|record| company_type.map_or(true, |kind| record.company_type == kind))
        .filter(|record| {
            query.search.as_deref().map_or(true, |needle| {
                record.name.contains(needle) || record.activity_normalized.contains(needle)
            })
        })
        .take(limit)
        .cloned()
        .collect();

    (StatusCode::OK, Json(companies)).into_response()
}

pub(crate) async fn read_company(
    State(ctx): State<Arc<ApiContext>>,
    Path(id): Path<u64>,
) -> Response {
    let board = ctx.store.current();
    match board
        .snapshot
        .companies
        .iter()
        .find(|record| record.id == id)
    {
        Some(record) => (StatusCode::OK, Json(record.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no company with id {id}") })),
        )
            .into_response(),
    }
}

pub(crate) async fn methodology() -> Json<serde_json::Value> {
    Json(json!({
        "title": "Methodology",
        "description": "How we process data and compute metrics.",
        "content_ar": "تم استخراج البيانات من السجل الوطني للشركات الأهلية.\n\n\
مؤشر 'بحث' (Ba7ath Index) هو مؤشر مركب يقيس ثلاث أبعاد رئيسية (0-100):\n\
1. الاعتماد على الموارد العمومية (40%): نسبة الشركات في قطاعات الفلاحة، المناجم، والبيئة.\n\
2. التركيز القطاعي (40%): مدى هيمنة قطاع واحد على اقتصاد الجهة.\n\
3. التوازن المحلي/الجهوي (20%): الفرق بين نسبة الشركات المحلية والجهوية.\n\n\
صيغة الاحتساب: INDEX = 100 * (0.4 * s1 + 0.4 * s2 + 0.2 * s3)"
    }))
}

pub(crate) async fn sources() -> Json<serde_json::Value> {
    Json(json!([
        {
            "name": "RNE",
            "url": "https://www.registre-entreprises.tn",
            "description_ar": "للتثبت من الوضعية القانونية للشركة."
        },
        {
            "name": "JORT",
            "url": "http://www.iort.gov.tn",
            "description_ar": "للبحث عن النصوص التأسيسية."
        },
        {
            "name": "INS",
            "url": "http://www.ins.tn",
            "description_ar": "للمقارنة مع الإحصائيات الرسمية."
        }
    ]))
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshSummary {
    pub(crate) version: u64,
    pub(crate) total: usize,
    pub(crate) skipped: usize,
}

/// Reloads the dataset file and swaps in a freshly scored board. This
/// is the only write path; every read endpoint serves the cached board.
pub(crate) async fn refresh_dataset(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<RefreshSummary>, AppError> {
    let outcome = load_dataset(&ctx.data_path)?;
    let skipped = outcome.skipped;
    let board = ctx.store.install(outcome.companies, &ctx.engine)?;

    info!(
        version = board.snapshot.version,
        total = board.snapshot.companies.len(),
        skipped,
        "dataset refreshed and rescored"
    );

    Ok(Json(RefreshSummary {
        version: board.snapshot.version,
        total: board.snapshot.companies.len(),
        skipped,
    }))
}

fn unknown_wilaya(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown wilaya '{}'", name.trim()) })),
    )
        .into_response()
}

fn bad_filter(field: &str, value: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("invalid {field} filter '{value}'") })),
    )
        .into_response()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
