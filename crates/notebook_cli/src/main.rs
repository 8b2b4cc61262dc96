//! Interactive notebook client.
//!
//! # Responsibility
//! - Thin menu loop over the notebook JSON-RPC methods.
//! - Always print either a confirmation or a reason string.

use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/";
const TIMESTAMP_HINT: &str = "leave blank for server time";

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

struct RpcClient {
    http: reqwest::blocking::Client,
    url: String,
    next_id: u64,
}

impl RpcClient {
    fn new(url: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            url,
            next_id: 1,
        }
    }

    fn call(&mut self, method: &str, params: Value) -> Result<Value, String> {
        let id = self.next_id;
        self.next_id += 1;
        let body = json!({"jsonrpc": "2.0", "method": method, "params": params, "id": id});

        let envelope: RpcEnvelope = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .and_then(|resp| resp.json())
            .map_err(|err| format!("request to {} failed: {err}", self.url))?;

        if let Some(err) = envelope.error {
            return Err(format!("server error {}: {}", err.code, err.message));
        }
        envelope
            .result
            .ok_or_else(|| "server returned no result".to_string())
    }
}

fn main() {
    let url = std::env::var("NOTEBOOK_SERVER_URL")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let mut client = RpcClient::new(url.clone());
    println!("Notebook client using {url}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!();
        println!("==== Notebook ====");
        println!("1. Add a note");
        println!("2. Get notes for a topic");
        println!("3. Enrich a topic from the encyclopedia");
        println!("4. List topics");
        println!("5. Exit");
        let Some(choice) = prompt(&mut lines, "Choose an option (1-5)") else {
            break;
        };

        let outcome = match choice.as_str() {
            "1" => add_note(&mut client, &mut lines),
            "2" => get_notes(&mut client, &mut lines),
            "3" => enrich_topic(&mut client, &mut lines),
            "4" => list_topics(&mut client),
            "5" => break,
            other => Err(format!("unknown option `{other}`")),
        };
        if let Err(reason) = outcome {
            println!("Error: {reason}");
        }
    }
    println!("Exiting...");
}

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

fn prompt(lines: &mut Lines<'_>, label: &str) -> Option<String> {
    print!("{label}: ");
    let _ = io::stdout().flush();
    lines
        .next()
        .and_then(Result::ok)
        .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
}

fn required(lines: &mut Lines<'_>, label: &str) -> Result<String, String> {
    prompt(lines, label).ok_or_else(|| "input closed".to_string())
}

fn add_note(client: &mut RpcClient, lines: &mut Lines<'_>) -> Result<(), String> {
    let topic = required(lines, "Topic")?;
    let text = required(lines, "Note text")?;
    let timestamp = required(lines, &format!("Timestamp ({TIMESTAMP_HINT})"))?;
    let timestamp = (!timestamp.trim().is_empty()).then_some(timestamp);

    match client.call("add_note", json!([topic, text, timestamp]))? {
        Value::Bool(true) => println!("Note added to '{topic}'."),
        _ => println!("Failed to add note (see server log)."),
    }
    Ok(())
}

fn get_notes(client: &mut RpcClient, lines: &mut Lines<'_>) -> Result<(), String> {
    let topic = required(lines, "Topic")?;
    let notes = list_items(client.call("get_notes", json!([topic]))?)?;
    if notes.is_empty() {
        println!("No notes found for topic '{topic}'.");
        return Ok(());
    }

    println!("Notes for topic '{topic}':");
    for (idx, note) in notes.iter().enumerate() {
        println!(
            "{}. [{}] {}",
            idx + 1,
            note["timestamp"].as_str().unwrap_or("?"),
            note["text"].as_str().unwrap_or("")
        );
    }
    Ok(())
}

fn enrich_topic(client: &mut RpcClient, lines: &mut Lines<'_>) -> Result<(), String> {
    let topic = required(lines, "Topic")?;
    let term = required(lines, "Search term (blank = topic name)")?;
    let term = (!term.trim().is_empty()).then_some(term);

    let result = client.call("add_enriched_note", json!([topic, term]))?;
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        return Err(error.to_string());
    }

    let title = result["info"]["title"].as_str().unwrap_or("?");
    let link = result["info"]["link"].as_str().unwrap_or("?");
    let message = result["message"].as_str().unwrap_or("");
    if result["success"].as_bool() == Some(true) {
        println!("Added encyclopedia entry to '{topic}'.");
        println!("Title: {title}");
        println!("Link: {link}");
        Ok(())
    } else {
        Err(format!("found '{title}' but could not store it: {message}"))
    }
}

/// Unwraps a list result, surfacing `{error}` objects as the reason.
fn list_items(result: Value) -> Result<Vec<Value>, String> {
    match result {
        Value::Array(items) => Ok(items),
        other => Err(other
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unexpected response from server")
            .to_string()),
    }
}

fn list_topics(client: &mut RpcClient) -> Result<(), String> {
    let topics = list_items(client.call("list_topics", json!([]))?)?;
    if topics.is_empty() {
        println!("No topics yet.");
    }
    for topic in topics {
        println!(
            "- {} ({} notes)",
            topic["name"].as_str().unwrap_or("?"),
            topic["note_count"].as_u64().unwrap_or(0)
        );
    }
    Ok(())
}
