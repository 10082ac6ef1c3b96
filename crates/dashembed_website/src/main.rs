mod config;
mod ctrlc;
mod dashboard;
mod templates;
mod token;

use config::with_config;
use handlebars::RenderError;
use std::convert::Infallible;
use std::sync::Arc;
use templates::{with_templates, IndexTemplate};
use thiserror::Error;
use token::TokenError;
use tracing::{error, info, info_span};
use warp::{
    http::{header, StatusCode},
    Filter,
};

type Config = Arc<config::Config>;
type Templates = Arc<templates::Templates<'static>>;

const HEADING: &str = "My Embedded Tableau Dashboard";

#[derive(Debug, Error)]
enum PageError {
    #[error("issue token: {0}")]
    Token(#[from] TokenError),
    #[error("render index: {0}")]
    Render(#[from] RenderError),
}

fn render_index(
    config: &config::Config,
    templates: &templates::Templates<'static>,
) -> Result<String, PageError> {
    let issued = token::issue(
        &config.client_id,
        &config.key_id,
        config.secret_key.unsecure(),
        &config.user,
    )?;

    let html = templates.render_index(&IndexTemplate {
        heading: HEADING.to_owned(),
        token: issued.token,
        dashboard_url: dashboard::url_for(config),
    })?;
    Ok(html)
}

async fn index_route(
    templates: Templates,
    config: Config,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let reply: Box<dyn warp::Reply> = match render_index(&config, &templates) {
        Ok(html) => Box::new(warp::reply::with_header(
            warp::reply::html(html),
            header::CACHE_CONTROL,
            "no-store",
        )),
        Err(err) => {
            error!(error = %err, "index failed");
            Box::new(warp::reply::with_status(
                "Internal Server Error",
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    };
    Ok(reply)
}

async fn health_route() -> Result<impl warp::Reply, Infallible> {
    Ok("ok")
}

fn routes(
    config: Config,
    templates: Templates,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let index = warp::get()
        .and(warp::path::end())
        .and(with_templates(templates))
        .and(with_config(config))
        .and_then(index_route);

    let health = warp::get()
        .and(warp::path!("health"))
        .and_then(health_route);

    index.or(health)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Local development only; deployments set the variables directly.
    dotenvy::dotenv().ok();

    dashembed_tracing::setup(dashembed_tracing::Config {
        service_name: "website",
        default_filter: "info",
    })?;

    let config = config::load()?;
    let config = Arc::new(config);
    let templates = templates::load()?;
    let templates = Arc::new(templates);

    info!(
        region = %config.region,
        site_id = %config.site_id,
        user = %config.user,
        client_id = %config.client_id,
        key_id = %config.key_id,
        secret_key = "***",
        workbook = %config.workbook,
        worksheet = %config.worksheet,
        "config loaded"
    );

    // Fail before binding if the credentials cannot produce a verifiable token.
    let probe = token::issue(
        &config.client_id,
        &config.key_id,
        config.secret_key.unsecure(),
        &config.user,
    )?;
    token::verify(&probe.token, config.secret_key.unsecure(), &config.client_id)?;
    let header = token::decode_header_fields(&probe.token)?;
    info!(
        kid = %header.kid,
        lifetime_secs = probe.expires_at - probe.issued_at,
        "token self-check passed"
    );

    let routes = routes(config.clone(), templates)
        .with(warp::log::custom(|info| {
            info!(
                status = info.status().as_u16(),
                duration_ms = info.elapsed().as_millis() as u64,
                "request finished"
            );
        }))
        .with(warp::trace(|info| {
            info_span!(
                "request",
                method = %info.method(),
                path = info.path(),
                user_agent = info.user_agent().unwrap_or(""),
            )
        }));

    let (addr, server) =
        warp::serve(routes).try_bind_with_graceful_shutdown(config.bind, ctrlc::ctrl_c())?;
    info!(%addr, "listening");
    server.await;

    info!("shut down");
    Ok(())
}
