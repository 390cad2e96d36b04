use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use nodesub::models::ConversionOptions;
use nodesub::settings::init_settings;
use nodesub::store::{JsonFileNodeSource, NodeSource};
use nodesub::web_handlers::{self, AppState};
use nodesub::{convert_nodes, Settings};

/// Convert stored proxy nodes into client subscription documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (e.g., 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Listen port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// JSON node file to convert directly instead of starting the server
    #[arg(long, value_name = "FILE")]
    nodes: Option<String>,

    /// Output format for direct conversion, defaults to the configured format
    #[arg(short, long, value_name = "FORMAT")]
    target: Option<String>,

    /// Output file for direct conversion (must be used with --nodes)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<String>,
}

/// Convert a node file once and write the document to `output`.
fn convert_file(nodes_path: &str, target: &str, output: &str) -> Result<(), String> {
    let source = JsonFileNodeSource::new(nodes_path, true);
    let nodes = source.get_nodes(None).map_err(|e| e.to_string())?;
    let result =
        convert_nodes(&nodes, target, &ConversionOptions::default()).map_err(|e| e.to_string())?;
    std::fs::write(output, &result.content)
        .map_err(|e| format!("Failed to write output file '{}': {}", output, e))?;
    info!(
        "Wrote {} document to {} ({} nodes skipped)",
        target,
        output,
        result.skipped.len()
    );
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    if args.nodes.is_some() != args.output.is_some() {
        eprintln!("Error: --nodes and -o/--output must be used together");
        std::process::exit(1);
    }

    if let Some(path) = args.config.as_deref() {
        if let Err(e) = init_settings(path) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    let settings = Settings::current();

    if let (Some(nodes_path), Some(output)) = (args.nodes.as_deref(), args.output.as_deref()) {
        let target = args.target.as_deref().unwrap_or(&settings.default_format);
        if let Err(e) = convert_file(nodes_path, target, output) {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let address = args
        .address
        .unwrap_or_else(|| settings.listen_address.clone());
    let port = args.port.unwrap_or(settings.listen_port);

    let source: Arc<dyn NodeSource> = Arc::new(JsonFileNodeSource::new(
        &settings.nodes_path,
        settings.reload_nodes_on_request,
    ));
    let state = web::Data::new(AppState::new(source));

    info!(
        "nodesub starting on {}:{}, serving nodes from '{}'",
        address, port, settings.nodes_path
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(web_handlers::config)
    })
    .bind((address.as_str(), port))?
    .workers(settings.max_concur_threads)
    .run()
    .await
}
