use anyhow::{anyhow, Context as _};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use routecontract::{BufferedResponse, ContractConfig, Context, FilePart, HttpRequest, MultipartForm, RouterBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod handlers;
mod models;
mod registry;
mod store;

#[derive(Parser)]
#[command(name = "users_api")]
#[command(about = "Users API built on routecontract", long_about = None)]
struct Cli {
    /// Contract configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated API document
    Spec {
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Dispatch one request through the router and print the response
    Call {
        /// HTTP method, e.g. GET
        method: String,
        /// Request URI including the query string
        uri: String,
        /// JSON body
        #[arg(short, long)]
        json: Option<String>,
        /// Multipart text value, `name=value` (repeatable)
        #[arg(long = "form")]
        form: Vec<String>,
        /// Multipart file part, `name=path` (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ContractConfig::load(path)?,
        None => ContractConfig::from_env(),
    };

    let mut builder = RouterBuilder::new(config);
    registry::register_all(&mut builder, Arc::new(store::UserStore::new()))?;
    let router = builder.seal();

    match cli.command {
        Commands::Spec { format } => {
            let document = router.emit_document();
            let text = match format {
                Format::Json => document.to_json_pretty()?,
                Format::Yaml => document.to_yaml()?,
            };
            println!("{text}");
        }
        Commands::Call {
            method,
            uri,
            json,
            form,
            files,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid method {method}"))?;
            let mut request = HttpRequest::new(method, &uri);
            if let Some(body) = json {
                request = request
                    .with_header("content-type", "application/json")
                    .with_body(body);
            }
            if !form.is_empty() || !files.is_empty() {
                request = request.with_form(build_form(&form, &files)?);
            }

            let ctx = Context::from_header(None);
            let mut response = BufferedResponse::new();
            router.dispatch(&ctx, &request, &mut response);
            println!("{}", response.status);
            println!("{}", String::from_utf8_lossy(&response.body));
        }
    }
    Ok(())
}

fn build_form(values: &[String], files: &[String]) -> anyhow::Result<MultipartForm> {
    let mut form = MultipartForm::new();
    for entry in values {
        let (name, value) = split_pair(entry)?;
        form = form.with_value(name, value);
    }
    for entry in files {
        let (name, path) = split_pair(entry)?;
        let data = std::fs::read(path).with_context(|| format!("cannot read {path}"))?;
        let filename = PathBuf::from(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        form = form.with_file(name, FilePart::new(filename, data));
    }
    Ok(form)
}

fn split_pair(entry: &str) -> anyhow::Result<(&str, &str)> {
    entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got {entry}"))
}
