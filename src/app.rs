use crate::{api, asset::AssetStore, setting::Setting, Error, Result, Service};
use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{
    body::MessageBody,
    dev::{fn_service, ServiceFactory, ServiceRequest, ServiceResponse},
    error::{JsonPayloadError, QueryPayloadError},
    middleware, web, App as WebApp, HttpRequest, HttpServer,
};
use sea_orm::{ConnectOptions, Database};
use std::path::Path;
use tracing::{error, info};

pub struct AppState {
    pub service: Service,
    pub setting: Setting,
}

impl AppState {
    pub async fn create<P: AsRef<Path>>(
        setting_path: Option<P>,
        setting_env_prefix: Option<String>,
    ) -> Result<Self> {
        let env_notice = setting_env_prefix
            .as_ref()
            .map(|s| {
                format!(
                    ", config will be overrided by ENV seting with prefix `{}_`",
                    s
                )
            })
            .unwrap_or_default();

        let setting = if let Some(path) = setting_path {
            info!("Load config {:?}{}", path.as_ref(), env_notice);
            Setting::read(path.as_ref(), setting_env_prefix)?
        } else if let Some(prefix) = setting_env_prefix {
            info!("Load default config{}", env_notice);
            Setting::from_env(prefix)?
        } else {
            info!("Load default config");
            Setting::default()
        };

        info!(
            db_url = setting.db_url.as_str(),
            upload_dir = ?setting.upload.dir,
            "{:?}",
            setting.network
        );

        Self::from_setting(setting).await
    }

    pub async fn from_setting(mut setting: Setting) -> Result<Self> {
        setting.auth.ensure_secret();
        let mut options = ConnectOptions::new(setting.db_url.clone());
        options.sqlx_logging_level(tracing::log::LevelFilter::Trace);
        if let Some(max) = setting.db_max_connections {
            options.max_connections(max);
        }
        let conn = Database::connect(options).await?;

        tokio::fs::create_dir_all(&setting.upload.dir).await?;
        let assets = AssetStore::new(&setting.upload);
        let service = Service::new(conn, assets);

        Ok(Self { service, setting })
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::Validation(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::Validation(err.to_string()).into()
}

fn cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        Cors::default()
            .allow_any_origin()
            .allow_any_header()
            .allow_any_method()
            .max_age(86_400)
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_header()
            .allow_any_method()
            .supports_credentials()
            .max_age(86_400)
    }
}

pub fn create_web_app(
    data: web::Data<AppState>,
) -> WebApp<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let upload = data.setting.upload.clone();
    let site_dir = data.setting.site_dir.clone();
    let cors = cors(&data.setting.network.cors_origins);

    let mut app = WebApp::new()
        .app_data(data)
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .wrap(middleware::Logger::default()) // enable logger
        .wrap(cors)
        .service(api::scope())
        .service(Files::new(&upload.url_prefix, &upload.dir));

    // built frontend, unknown paths fall back to index.html for client routing
    if let Some(dir) = site_dir {
        let index = dir.join("index.html");
        app = app.service(Files::new("/", dir).index_file("index.html").default_handler(
            fn_service(move |req: ServiceRequest| {
                let index = index.clone();
                async move {
                    let (req, _) = req.into_parts();
                    let file = NamedFile::open_async(index).await?;
                    let res = file.into_response(&req);
                    Ok(ServiceResponse::new(req, res))
                }
            }),
        ));
    }
    app
}

/// start app and tasks
pub async fn start(state: AppState) -> Result<()> {
    let state = web::Data::new(state);

    if state.setting.upload.sweep_on_start {
        match state.service.sweep_gallery().await {
            Ok(removed) => info!(removed, "gallery sweep finished"),
            Err(err) => error!(error = err.to_string(), "gallery sweep failed"),
        }
    }

    let c_data = state.clone();
    let server = HttpServer::new(move || create_web_app(c_data.clone()));
    let num = if state.setting.thread.http == 0 {
        num_cpus::get()
    } else {
        state.setting.thread.http
    };
    let host = state.setting.network.host.clone();
    let port = state.setting.network.port;
    info!("Start http server {}:{}", host, port);
    server.workers(num).bind((host, port))?.run().await?;
    Ok(())
}
