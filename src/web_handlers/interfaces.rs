use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use log::{debug, error, warn};
use serde::Serialize;

use crate::interfaces::subconverter::convert_nodes;
use crate::models::{ConversionOptions, FormatInfo, SubscriptionFormat};
use crate::store::NodeSource;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn NodeSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn NodeSource>) -> Self {
        Self { source }
    }
}

#[derive(Debug, Serialize)]
struct FormatEntry {
    id: &'static str,
    #[serde(flatten)]
    info: FormatInfo,
}

/// Parse the `ids` query parameter, a comma-separated list of node ids
pub fn parse_ids(value: &str) -> Result<Vec<u64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().map_err(|_| format!("Invalid node id: {}", s)))
        .collect()
}

pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().body("nodesub is running!")
}

/// Handler listing every canonical format with its metadata
pub async fn formats_handler() -> HttpResponse {
    let formats: Vec<FormatEntry> = SubscriptionFormat::ALL
        .iter()
        .map(|f| FormatEntry {
            id: f.to_str(),
            info: f.info(),
        })
        .collect();
    HttpResponse::Ok().json(formats)
}

/// Handler for subscription conversion
pub async fn sub_handler(
    query: web::Query<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    debug!("Received subscription request: {:?}", query);
    let query = query.into_inner();

    let target = match query.get("target").map(|t| t.trim()).filter(|t| !t.is_empty()) {
        Some(target) => target.to_string(),
        None => return HttpResponse::BadRequest().body("Missing target parameter"),
    };

    let ids = match query.get("ids").filter(|s| !s.trim().is_empty()) {
        Some(ids) => match parse_ids(ids) {
            Ok(ids) => Some(ids),
            Err(e) => return HttpResponse::BadRequest().body(e),
        },
        None => None,
    };

    let options = match ConversionOptions::from_query(&query) {
        Ok(options) => options,
        Err(e) => {
            warn!("Rejected conversion options: {}", e);
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    let nodes = match state.source.get_nodes(ids.as_deref()) {
        Ok(nodes) => nodes,
        Err(e) => {
            error!("Failed to load nodes: {}", e);
            return HttpResponse::InternalServerError().body(format!("Failed to load nodes: {}", e));
        }
    };

    let result = web::block(move || convert_nodes(&nodes, &target, &options)).await;

    match result {
        Ok(Ok(result)) => HttpResponse::Ok()
            .content_type(result.content_type.as_str())
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", result.filename),
            ))
            .body(result.content),
        Ok(Err(e)) => {
            warn!("Conversion failed: {}", e);
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => {
            error!("Conversion task failed: {}", e);
            HttpResponse::InternalServerError().body("Conversion task failed")
        }
    }
}

/// Register the API endpoints with Actix Web
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_handler))
        .route("/formats", web::get().to(formats_handler))
        .route("/sub", web::get().to(sub_handler));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1, 2,,3"), Ok(vec![1, 2, 3]));
        assert!(parse_ids("1,x").is_err());
    }
}
