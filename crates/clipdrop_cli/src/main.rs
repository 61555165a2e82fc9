//! Command-line client for the ClipDrop API.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use clipdrop_core::{DEFAULT_CLI_SERVER_URL, MAX_TTL_DAYS};
use serde_json::Value;
use std::io::{self, Read};
use std::time::{Duration, Instant};

const MAX_EXPIRES_IN_MINUTES: i64 = MAX_TTL_DAYS * 24 * 60;

/// Exit code for password outcomes, distinct from request failures.
const EXIT_PASSWORD: i32 = 2;

#[derive(Parser)]
#[command(name = "clip", about = "ClipDrop CLI", version)]
struct Cli {
    /// Server URL (can also be set via CLIPDROP_SERVER env var)
    #[arg(short, long, env = "CLIPDROP_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Store content from a file or stdin and print its key
    Add {
        #[arg(short, long)]
        file: Option<String>,
        /// Require this password to read the item
        #[arg(short, long)]
        password: Option<String>,
        /// Minutes until the item expires (server default: 10)
        #[arg(short, long, value_parser = parse_expires_in)]
        expires_in: Option<i64>,
    },
    /// Print an item's content
    Get {
        key: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Delete an item
    Rm { key: String },
    /// Remove expired items now
    Sweep {
        /// Cleanup secret (can also be set via CLIPDROP_CRON_SECRET env var)
        #[arg(long, env = "CLIPDROP_CRON_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

fn parse_expires_in(raw: &str) -> Result<i64, String> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of minutes", raw))?;
    if !(1..=MAX_EXPIRES_IN_MINUTES).contains(&minutes) {
        return Err(format!(
            "must be between 1 and {} minutes",
            MAX_EXPIRES_IN_MINUTES
        ));
    }
    Ok(minutes)
}

fn expires_at_from_minutes(now: DateTime<Utc>, minutes: i64) -> String {
    (now + ChronoDuration::minutes(minutes)).to_rfc3339()
}

fn create_body(content: String, password: Option<String>, expires_at: Option<String>) -> Value {
    let mut body = serde_json::json!({ "content": content });
    if let Some(password) = password {
        body["password"] = password.into();
    }
    if let Some(expires_at) = expires_at {
        body["expires_at"] = expires_at.into();
    }
    body
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

fn log_timing_parts(timing: bool, label: &str, request: Duration, parse: Option<Duration>) {
    if !timing {
        return;
    }
    if let Some(parse) = parse {
        let total = request + parse;
        eprintln!(
            "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
            label,
            request.as_secs_f64() * 1000.0,
            parse.as_secs_f64() * 1000.0,
            total.as_secs_f64() * 1000.0
        );
    } else {
        log_timing(timing, label, request);
    }
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

fn exit_with(action: &str, message: String) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn render_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn format_created_output(created: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(created);
    }
    created
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "response missing 'key' field".to_string())
}

/// A retrieval response as reported by the server.
#[derive(Debug, PartialEq, Eq)]
enum GetOutcome {
    Content { content: String, view_count: u64 },
    PasswordRequired,
    PasswordIncorrect,
}

fn parse_get_response(body: &Value) -> Result<GetOutcome, String> {
    match body.get("status").and_then(Value::as_str) {
        Some("content") => {
            let content = body
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| "response missing 'content' field".to_string())?;
            let view_count = body
                .get("view_count")
                .and_then(Value::as_u64)
                .ok_or_else(|| "response missing 'view_count' field".to_string())?;
            Ok(GetOutcome::Content {
                content: content.to_string(),
                view_count,
            })
        }
        Some("password_required") => Ok(GetOutcome::PasswordRequired),
        Some("password_incorrect") => Ok(GetOutcome::PasswordIncorrect),
        Some(other) => Err(format!("unexpected status '{}'", other)),
        None => Err("response missing 'status' field".to_string()),
    }
}

fn password_message(outcome: &GetOutcome) -> Option<&'static str> {
    match outcome {
        GetOutcome::PasswordRequired => Some("Item is password protected; pass --password"),
        GetOutcome::PasswordIncorrect => Some("Incorrect password"),
        GetOutcome::Content { .. } => None,
    }
}

fn format_delete_output(key: &str, response: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(response);
    }
    Ok(format!("Deleted item: {}", key))
}

fn format_sweep_output(response: &Value, json: bool) -> Result<String, String> {
    if json {
        return render_json(response);
    }
    let deleted = response
        .get("deleted_count")
        .and_then(Value::as_u64)
        .ok_or_else(|| "response missing 'deleted_count' field".to_string())?;
    Ok(format!("Deleted {} expired item(s)", deleted))
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    api_url(server, segments).unwrap_or_else(|message| exit_with(action, message))
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn resolve_server(server: Option<String>) -> String {
    server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn read_content(file: Option<String>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    let command = match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        command => command,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = normalize_server(resolve_server(server));

    match command {
        Commands::Completions { .. } => {}
        Commands::Add {
            file,
            password,
            expires_in,
        } => {
            let endpoint = api_url_or_exit(&server, "Add", &["api", "clipboard"]);
            let content = read_content(file)?;
            let expires_at = expires_in.map(|minutes| expires_at_from_minutes(Utc::now(), minutes));
            let body = create_body(content, password, expires_at);

            let request_start = Instant::now();
            let res = client.post(endpoint).json(&body).send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Add").await;

            let parse_start = Instant::now();
            let created: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();

            log_timing_parts(timing, "add", request_elapsed, Some(parse_elapsed));
            let output = format_created_output(&created, json)
                .unwrap_or_else(|message| exit_with("Add", message));
            println!("{}", output);
        }
        Commands::Get { key, password } => {
            let endpoint = api_url_or_exit(&server, "Get", &["api", "clipboard", key.as_str()]);
            let mut request = client.get(endpoint);
            if let Some(password) = password.as_deref() {
                request = request.query(&[("pwd", password)]);
            }

            let request_start = Instant::now();
            let res = request.send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Get").await;

            let parse_start = Instant::now();
            let body: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();

            log_timing_parts(timing, "get", request_elapsed, Some(parse_elapsed));
            let outcome =
                parse_get_response(&body).unwrap_or_else(|message| exit_with("Get", message));
            if json {
                println!("{}", render_json(&body)?);
            }
            if let Some(message) = password_message(&outcome) {
                eprintln!("{}", message);
                std::process::exit(EXIT_PASSWORD);
            }
            if let GetOutcome::Content {
                content,
                view_count,
            } = outcome
            {
                if !json {
                    println!("{}", content);
                    eprintln!("[views: {}]", view_count);
                }
            }
        }
        Commands::Rm { key } => {
            let endpoint = api_url_or_exit(&server, "Rm", &["api", "clipboard", key.as_str()]);
            let request_start = Instant::now();
            let res = client.delete(endpoint).send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Rm").await;

            let parse_start = Instant::now();
            let response: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();
            log_timing_parts(timing, "rm", request_elapsed, Some(parse_elapsed));

            let output = format_delete_output(&key, &response, json)
                .unwrap_or_else(|message| exit_with("Rm", message));
            println!("{}", output);
        }
        Commands::Sweep { secret } => {
            let endpoint = api_url_or_exit(&server, "Sweep", &["api", "cleanup"]);
            let mut request = client.post(endpoint);
            if let Some(secret) = secret.as_deref() {
                request = request.bearer_auth(secret);
            }

            let request_start = Instant::now();
            let res = request.send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Sweep").await;

            let parse_start = Instant::now();
            let response: Value = res.json().await?;
            let parse_elapsed = parse_start.elapsed();
            log_timing_parts(timing, "sweep", request_elapsed, Some(parse_elapsed));

            let output = format_sweep_output(&response, json)
                .unwrap_or_else(|message| exit_with("Sweep", message));
            println!("{}", output);
        }
    }

    Ok(())
}
