use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ALLOW, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "restful-cli")]
#[command(about = "Client for a running restful-api server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request and print the response
    Request {
        /// HTTP method (GET, POST, PUT, DELETE, PATCH, ...)
        method: String,
        /// Path, including any query string
        path: String,
        /// Accept header
        #[arg(short, long, default_value = "application/json")]
        accept: String,
        /// Request body
        #[arg(short, long)]
        body: Option<String>,
        /// Content-Type of the body
        #[arg(short = 't', long, default_value = "application/json")]
        content_type: String,
    },
    /// List the methods a path accepts
    Options {
        /// Path to inspect
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Request {
            method,
            path,
            accept,
            body,
            content_type,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT, HeaderValue::from_str(&accept)?);

            let mut request = client.request(method, format!("{base}{path}"));
            if let Some(body) = body {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
                request = request.body(body);
            }
            let res = request.headers(headers).send().await?;
            print_response(res).await?;
        }
        Commands::Options { path } => {
            let res = client
                .request(Method::OPTIONS, format!("{base}{path}"))
                .send()
                .await?;
            match res.headers().get(ALLOW).and_then(|v| v.to_str().ok()) {
                Some(allow) => println!("{allow}"),
                None => {
                    eprintln!("Error: no methods available at {path} (status {})", res.status());
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("{status}");
    for (name, value) in res.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    println!();

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
