//! Draftsheet API Server binary
//!
//! HTTP REST API for turning spreadsheet rows into email drafts.

use clap::Parser;
use draftsheet::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "draftsheet-server")]
#[command(version)]
#[command(about = "Draftsheet API Server - spreadsheet rows to email drafts over HTTP")]
#[command(long_about = r#"
Draftsheet API Server

Endpoints:
  - POST /api/v1/inspect   - Read a spreadsheet and list its columns
  - POST /api/v1/generate  - Generate drafts and return a preview
  - POST /api/v1/export    - Export drafts as JSON or CSV

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  draftsheet-server                           # Start on localhost:8080
  draftsheet-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/generate \
    -H "Content-Type: application/json" \
    -d '{"file_path": "contacts.xlsx",
         "mapping": {"to": "Email", "subject": "Name", "body": "Notes"},
         "templates": {"subject": "Hello {{ Name }}"}}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "DRAFTSHEET_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "DRAFTSHEET_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
