//! solace-cli: terminal client for the Solace journaling server
//!
//! # Subcommands
//! - `write <text> [--at <rfc3339>]`: submit an entry and print the reply
//! - `entries [-n <limit>] [--json]`: list recent entries
//! - `dashboard [--json]`: streak, mood, growth and top themes
//! - `prompts [-n <limit>]`: suggested writing prompts
//! - `status`: show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";
const DEFAULT_LIMIT: usize = 10;
const PREVIEW_CHARS: usize = 72;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "solace-cli", version, about = "Solace journaling companion CLI")]
struct Cli {
    /// Solace HTTP server URL (overrides SOLACE_HTTP_URL env var)
    #[arg(long, env = "SOLACE_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a journal entry
    Write {
        /// Entry text
        text: String,

        /// Backfill the entry at this RFC 3339 timestamp
        #[arg(long)]
        at: Option<String>,
    },

    /// List recent entries, newest first
    Entries {
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show the insights dashboard
    Dashboard {
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Suggest writing prompts based on recent entries
    Prompts {
        #[arg(short = 'n', long, default_value_t = 3)]
        limit: usize,
    },

    /// Show Solace server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EntryView {
    pub id: u64,
    pub text: String,
    pub sentiment: String,
    #[serde(default)]
    pub themes: Vec<String>,
    pub timestamp: String,
    pub ai_response: String,
    pub follow_up_question: String,
    pub analysis_source: String,
}

#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryView>,
    pub count: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct PromptsResponse {
    pub prompts: Vec<String>,
}

// ============================================================================
// Formatting (pure)
// ============================================================================

/// `very_negative` → `very negative`
pub fn humanize(label: &str) -> String {
    label.replace('_', " ")
}

/// First line of `text`, capped at `max` chars with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// One-line summary: `#id date sentiment [themes] preview`.
pub fn format_entry_line(entry: &EntryView) -> String {
    let date = entry.timestamp.get(..10).unwrap_or(&entry.timestamp);
    let themes = if entry.themes.is_empty() {
        String::new()
    } else {
        format!(" [{}]", entry.themes.join(", "))
    };
    format!(
        "#{:<4} {}  {:<13}{}  {}",
        entry.id,
        date,
        humanize(&entry.sentiment),
        themes,
        preview(&entry.text, PREVIEW_CHARS)
    )
}

/// Companion reply printed after `write`.
pub fn format_reply(entry: &EntryView) -> String {
    let mut out = format!(
        "Saved entry #{} ({}, {} analysis)\n\n{}\n\n→ {}",
        entry.id,
        humanize(&entry.sentiment),
        entry.analysis_source,
        entry.ai_response,
        entry.follow_up_question
    );
    if !entry.themes.is_empty() {
        out.push_str(&format!("\n\nThemes: {}", entry.themes.join(", ")));
    }
    out
}

fn label_counts(value: &serde_json::Value) -> String {
    let labels: Vec<String> = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|c| Some(format!("{} ({})", humanize(c["label"].as_str()?), c["count"])))
                .collect()
        })
        .unwrap_or_default();
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

/// Human-readable rendering of a `GET /insights` body.
pub fn format_dashboard(body: &serde_json::Value) -> String {
    let metrics = &body["metrics"];
    let streak = metrics["writing_streak"].as_u64().unwrap_or(0);
    let day_word = if streak == 1 { "day" } else { "days" };

    let trend = &metrics["mood_trend"];
    let trend_text = if trend["slope"].is_null() {
        "not enough data".to_string()
    } else {
        format!(
            "{} (slope {:+.2})",
            trend["direction"].as_str().unwrap_or("stable"),
            trend["slope"].as_f64().unwrap_or(0.0)
        )
    };

    let mood = &metrics["current_mood"];
    let mood_text = if mood["entry_id"].is_null() {
        "no entries yet".to_string()
    } else {
        humanize(mood["sentiment"].as_str().unwrap_or("neutral"))
    };

    let growth = &metrics["growth_score"];
    let average = body["average_sentiment"]
        .as_str()
        .map(humanize)
        .unwrap_or_else(|| "-".to_string());

    [
        format!("Entries:        {}", body["total_entries"].as_u64().unwrap_or(0)),
        format!("Writing streak: {} {}", streak, day_word),
        format!("Mood trend:     {}", trend_text),
        format!("Current mood:   {}", mood_text),
        format!("Recent average: {}", average),
        format!(
            "Growth score:   {}/100 ({})",
            growth["score"].as_u64().unwrap_or(0),
            growth["label"].as_str().unwrap_or("no data")
        ),
        format!("Top themes:     {}", label_counts(&body["top_themes"])),
        format!("Top emotions:   {}", label_counts(&body["top_emotions"])),
    ]
    .join("\n")
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

/// Send a request; print the server's error and exit on non-2xx.
fn send(req: reqwest::blocking::RequestBuilder, url: &str) -> reqwest::blocking::Response {
    let resp = match req.send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("solace-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body: serde_json::Value = resp.json().unwrap_or_default();
        let message = body["error"].as_str().unwrap_or("unknown error");
        eprintln!("solace-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }

    resp
}

fn do_write(server: &str, text: &str, at: Option<&str>) -> anyhow::Result<()> {
    // Remote analysis may retry; allow for it.
    let client = client(60)?;
    let url = format!("{}/entries", server);
    let mut body = serde_json::json!({ "text": text });
    if let Some(at) = at {
        body["timestamp"] = serde_json::json!(at);
    }

    let entry: EntryView = send(client.post(&url).json(&body), &url).json()?;
    println!("{}", format_reply(&entry));
    Ok(())
}

fn do_entries(server: &str, limit: usize, json_output: bool) -> anyhow::Result<()> {
    let client = client(10)?;
    let url = format!("{}/entries?limit={}", server, limit);
    let resp = send(client.get(&url), &url);

    if json_output {
        let body: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let entries: EntriesResponse = resp.json()?;
    if entries.entries.is_empty() {
        eprintln!("No entries yet. Try: solace-cli write \"...\"");
        return Ok(());
    }
    for entry in &entries.entries {
        println!("{}", format_entry_line(entry));
    }
    if entries.total > entries.count {
        println!("\n({} of {} entries)", entries.count, entries.total);
    }
    Ok(())
}

fn do_dashboard(server: &str, json_output: bool) -> anyhow::Result<()> {
    let client = client(10)?;
    let url = format!("{}/insights", server);
    let body: serde_json::Value = send(client.get(&url), &url).json()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", format_dashboard(&body));
    }
    Ok(())
}

fn do_prompts(server: &str, limit: usize) -> anyhow::Result<()> {
    let client = client(10)?;
    let url = format!("{}/prompts?limit={}", server, limit);
    let prompts: PromptsResponse = send(client.get(&url), &url).json()?;
    for (i, prompt) in prompts.prompts.iter().enumerate() {
        println!("{}. {}", i + 1, prompt);
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = client(10)?;
    let url = format!("{}/health", server);

    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Solace server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Entries:       {}", body["entries"].as_u64().unwrap_or(0));
            println!("Analysis:      {}", body["analysis_backend"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            eprintln!("solace-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("solace-cli: cannot reach {}, {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Write { text, at } => do_write(&server, &text, at.as_deref()),
        Commands::Entries { limit, json } => do_entries(&server, limit, json),
        Commands::Dashboard { json } => do_dashboard(&server, json),
        Commands::Prompts { limit } => do_prompts(&server, limit),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("solace-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
