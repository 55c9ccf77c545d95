use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use crate::config::{AdminUserConfig, AppConfig, JwtConfig, MinioConfig, MongoConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::contact_repo::MongoContactRepository;
use crate::repository::inquiry_repo::MongoInquiryRepository;
use crate::repository::mongo;
use crate::repository::property_repo::MongoPropertyRepository;
use crate::repository::subscriber_repo::MongoSubscriberRepository;
use crate::repository::user_repo::MongoUserRepository;
use crate::router::auth_router::auth_router;
use crate::router::intake_router::intake_router;
use crate::router::property_router::property_router;
use crate::service::intake_service::{IntakeService, IntakeServiceImpl};
use crate::service::property_service::{PropertyService, PropertyServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::minio::MinioService;

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the router needs; tests assemble it from in-memory parts
#[derive(Clone)]
pub struct AppServices {
    pub user_service: Arc<dyn UserService>,
    pub property_service: Arc<dyn PropertyService>,
    pub intake_service: Arc<dyn IntakeService>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

pub fn create_router(services: AppServices, config: &AppConfig) -> Router {
    let auth_state = Arc::new(AuthState { jwt_utils: services.jwt_utils.clone() });

    let cors_layer = match &config.cors_allowed_origins {
        None => CorsLayer::new().allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
    };

    Router::new()
        .route("/", get(|| async { "DreamNest API is running" }))
        .route("/health", get(|| async { "OK" }))
        .merge(auth_router(services.user_service, auth_state.clone()))
        .merge(property_router(services.property_service, auth_state.clone()))
        .merge(intake_router(services.intake_service, auth_state))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, StartupError> {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;
        let minio_config = MinioConfig::from_env()?;

        let db = mongo::connect(&mongo_config).await?;
        mongo::ensure_indexes(&db).await?;

        let user_repo = Arc::new(MongoUserRepository::new(&db));
        let property_repo = Arc::new(MongoPropertyRepository::new(&db));
        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let image_store = Arc::new(MinioService::new(minio_config).await?);

        let user_service = Arc::new(UserServiceImpl::new(user_repo.clone(), jwt_utils.clone()));
        let property_service = Arc::new(PropertyServiceImpl::new(
            property_repo.clone(),
            user_repo,
            image_store,
            config.max_property_images,
        ));
        let intake_service = Arc::new(IntakeServiceImpl::new(
            Arc::new(MongoInquiryRepository::new(&db)),
            Arc::new(MongoContactRepository::new(&db)),
            Arc::new(MongoSubscriberRepository::new(&db)),
            property_repo,
        ));

        Self::create_first_admin_user(user_service.as_ref()).await;

        let services = AppServices { user_service, property_service, intake_service, jwt_utils };
        let router = create_router(services, &config);
        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), StartupError> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }

    async fn create_first_admin_user(user_service: &dyn UserService) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded, skipping seed: {e}");
                return;
            }
        };

        match user_service.seed_admin(&admin_conf).await {
            Ok(true) => info!("First admin user created"),
            Ok(false) => info!("Admin user already exists, skipping creation"),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
