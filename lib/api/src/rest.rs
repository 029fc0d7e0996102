use actix_cors::Cors;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use hyurim_core::Error as CoreError;
use hyurim_engine::{EngineError, RecommendationRequest, Recommender};
use hyurim_storage::EmbeddingStore;
use serde::Deserialize;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Recommender>,
    /// Where rebuilt embeddings are persisted, if anywhere
    pub store: Option<Arc<EmbeddingStore>>,
}

impl ApiState {
    pub fn new(engine: Arc<Recommender>) -> Self {
        Self { engine, store: None }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<EmbeddingStore>) -> Self {
        self.store = Some(store);
        self
    }
}

#[derive(Deserialize)]
struct TrendingQuery {
    limit: Option<usize>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: ApiState, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new().wrap(cors).configure(Self::configure(state.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register state and routes on an app
    pub fn configure(state: ApiState) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::new(state))
                .app_data(web::JsonConfig::default().error_handler(json_error))
                .route("/recommend", web::post().to(recommend))
                .route("/trending", web::get().to(trending))
                .route("/index/rebuild", web::post().to(rebuild_index))
                .route("/health", web::get().to(health));
        }
    }
}

/// Malformed bodies get the same error shape as validation failures
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = serde_json::json!({
        "error": err.to_string(),
        "field": null,
    });
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn engine_error_response(err: &EngineError) -> HttpResponse {
    let body = serde_json::json!({
        "error": err.to_string(),
        "field": err.field(),
    });
    match err {
        EngineError::InvalidPreference { .. } => HttpResponse::BadRequest().json(body),
        EngineError::Core(CoreError::ProviderUnavailable(_)) => HttpResponse::ServiceUnavailable().json(body),
        _ => {
            tracing::error!(error = %err, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

async fn recommend(
    state: web::Data<ApiState>,
    req: web::Json<RecommendationRequest>,
) -> ActixResult<HttpResponse> {
    match state.engine.recommend(&req) {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(engine_error_response(&e)),
    }
}

async fn trending(
    state: web::Data<ApiState>,
    query: web::Query<TrendingQuery>,
) -> ActixResult<HttpResponse> {
    let limit = query.limit.unwrap_or(state.engine.config().default_result_count);
    match state.engine.trending(limit) {
        Ok(items) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": items
        }))),
        Err(e) => Ok(engine_error_response(&e)),
    }
}

async fn rebuild_index(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    let state = state.into_inner();
    let result = web::block(move || {
        let report = state.engine.rebuild_index()?;
        if let Some(store) = &state.store {
            if let Err(e) = store.save(&state.engine.cache_snapshot()) {
                tracing::warn!(error = %e, "failed to persist embedding cache");
            }
        }
        Ok::<_, EngineError>(report)
    })
    .await?;

    match result {
        Ok(report) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": report
        }))),
        Err(e) => Ok(engine_error_response(&e)),
    }
}

async fn health(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "engine": state.engine.status(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use hyurim_core::{Catalog, FacilityId, FacilityRecord, ForestId, ForestRecord, InMemoryRepository};
    use hyurim_engine::{EngineConfig, ProviderKind};
    use serde_json::{json, Value};

    fn state(provider: ProviderKind) -> ApiState {
        let catalog = Catalog {
            forests: vec![ForestRecord {
                id: ForestId::from("F1"),
                name: "Jeolmul".to_string(),
                region: "Jeju".to_string(),
                address: String::new(),
                main_facilities: String::new(),
            }],
            facilities: vec![FacilityRecord {
                id: FacilityId(1),
                forest_id: ForestId::from("F1"),
                name: "Cabin 1".to_string(),
                facility_type: "cabin".to_string(),
                description: "family room with kitchen".to_string(),
                capacity_standard: 4,
                capacity_maximum: 6,
                price_off_weekday: 45_000,
                price_off_weekend: 60_000,
                price_peak_weekend: 80_000,
                amenities: Default::default(),
                popularity: 5.0,
            }],
            discount_policies: Vec::new(),
        };
        let mut config = EngineConfig::default();
        config.embedding.provider = provider;
        let engine = Recommender::with_repository(config, Arc::new(InMemoryRepository::new(catalog))).unwrap();
        ApiState::new(Arc::new(engine))
    }

    #[actix_web::test]
    async fn test_recommend_after_rebuild() {
        let app = test::init_service(App::new().configure(RestApi::configure(state(ProviderKind::Hashing)))).await;

        let req = test::TestRequest::post().uri("/index/rebuild").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["indexed"], json!(1));

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "family room", "preferences": {"capacity": 4}}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["path"], json!("vector"));
        assert_eq!(body["degraded"], json!(false));
        assert_eq!(body["results"][0]["facility_id"], json!(1));
        assert_eq!(body["results"][0]["rank"], json!(1));
    }

    #[actix_web::test]
    async fn test_validation_error_is_400_with_field() {
        let app = test::init_service(App::new().configure(RestApi::configure(state(ProviderKind::Hashing)))).await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "room", "preferences": {"capacity": 0}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["field"], json!("capacity"));

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "room", "mystery": true}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_empty_result_is_200() {
        let app = test::init_service(App::new().configure(RestApi::configure(state(ProviderKind::Disabled)))).await;

        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"query": "room", "preferences": {"capacity": 30}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["degraded"], json!(true));
        assert_eq!(body["relaxation"]["dropped"], json!(["capacity"]));
    }

    #[actix_web::test]
    async fn test_rebuild_without_provider_is_503() {
        let app = test::init_service(App::new().configure(RestApi::configure(state(ProviderKind::Disabled)))).await;
        let req = test::TestRequest::post().uri("/index/rebuild").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_health_and_trending() {
        let app = test::init_service(App::new().configure(RestApi::configure(state(ProviderKind::Hashing)))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["engine"]["provider"]["status"], json!("available"));
        assert_eq!(body["engine"]["index_built"], json!(false));

        let req = test::TestRequest::get().uri("/trending?limit=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"][0]["base_price"], json!(45000));
    }
}
