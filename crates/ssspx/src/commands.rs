use colored::Colorize;
use serde_json::Value;
use sssp_adapter::eids;
use sssp_adapter::{
    BidRequest, Bidder, GdprConsent, PageContext, ServerResponse, SsspAdapter, SyncOptions,
    SyncType,
};
use std::fs;
use std::io::{self, Read};

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("read stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let content = read_input(path)?;
    serde_json::from_str(&content).map_err(|e| format!("parse {path}: {e}"))
}

fn read_batch(path: &str) -> Result<Vec<BidRequest>, String> {
    let content = read_input(path)?;
    BidRequest::batch_from_json(&content).map_err(|e| format!("parse {path}: {e}"))
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("encode output: {e}"))
}

// ── validate ────────────────────────────────────────────────────

pub fn validate(adapter: &SsspAdapter, requests: &str) -> Result<(), String> {
    let bids = read_batch(requests)?;
    let mut valid = 0;
    for bid in &bids {
        if adapter.is_bid_request_valid(bid) {
            valid += 1;
            println!("{} {}", "VALID  ".green().bold(), bid.bid_id.cyan());
        } else {
            println!("{} {}", "INVALID".red().bold(), bid.bid_id.cyan());
        }
    }
    println!();
    println!("{} {}/{}", "Valid:".dimmed(), valid, bids.len());
    Ok(())
}

// ── eids ────────────────────────────────────────────────────────

pub fn eids(file: &str) -> Result<(), String> {
    let raw: Value = read_json(file)?;
    let table = eids::normalize(Some(&raw));
    let code = eids::reconcile(&table);

    for source in table.sources() {
        let ids = table.get(source).unwrap_or_default();
        println!("{} {}", format!("{source}:").dimmed(), ids.join(", ").cyan());
    }
    let badge = match code.code() {
        0 => code.to_string().green().bold(),
        -5 => code.to_string().red().bold(),
        _ => code.to_string().yellow().bold(),
    };
    println!();
    println!("{} {} ({:?})", "tdidRepetition:".dimmed(), badge, code);
    Ok(())
}

// ── build ───────────────────────────────────────────────────────

pub fn build(adapter: &SsspAdapter, requests: &str, page: &PageContext) -> Result<(), String> {
    let bids = read_batch(requests)?;
    let out = adapter.build_requests(&bids, page);
    if out.len() < bids.len() {
        eprintln!(
            "{}",
            format!("  ({} invalid bid request(s) skipped)", bids.len() - out.len()).dimmed()
        );
    }
    println!("{}", pretty(&out)?);
    Ok(())
}

// ── interpret ───────────────────────────────────────────────────

pub fn interpret(
    adapter: &SsspAdapter,
    response: &str,
    request: &str,
    page: &PageContext,
) -> Result<(), String> {
    let response: ServerResponse = read_json(response)?;
    let request: BidRequest = read_json(request)?;
    let bids = adapter.interpret_response(&response, &request, page);
    println!("{}", pretty(&bids)?);
    Ok(())
}

// ── syncs ───────────────────────────────────────────────────────

pub fn syncs(
    adapter: &SsspAdapter,
    responses: &str,
    iframe: bool,
    pixel: bool,
    gdpr_applies: Option<bool>,
    consent: &str,
    usp_consent: Option<&str>,
) -> Result<(), String> {
    let responses: Vec<ServerResponse> = read_json(responses)?;
    let options = SyncOptions {
        iframe_enabled: iframe,
        pixel_enabled: pixel,
    };
    let syncs = adapter.get_user_syncs(
        &options,
        &responses,
        &GdprConsent::new(gdpr_applies, consent),
        usp_consent,
    );
    if syncs.is_empty() {
        println!("{}", "no syncs".dimmed());
    }
    for sync in &syncs {
        let kind = match sync.kind {
            SyncType::Iframe => "iframe".magenta(),
            SyncType::Image => "image ".blue(),
        };
        println!("{} {}", kind, sync.url);
    }
    Ok(())
}

// ── spec ────────────────────────────────────────────────────────

pub fn spec(adapter: &SsspAdapter) -> Result<(), String> {
    println!("{}", pretty(adapter.spec())?);
    Ok(())
}
