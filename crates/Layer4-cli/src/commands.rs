//! One-shot subcommands: `process` and `bench`

use coalesce_foundation::Result;
use coalesce_service::{AppContext, ErrorBody, ProcessResponse};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

/// Submit every text concurrently; one output line per text, in input order
pub async fn process(ctx: &AppContext, texts: &[String]) -> anyhow::Result<()> {
    let results = submit_all(ctx, texts).await;
    let failures = results.iter().filter(|r| r.is_err()).count();

    for result in &results {
        println!("{}", serde_json::to_string(&render(result))?);
    }
    println!("{}", serde_json::to_string(&ctx.service().health())?);

    ctx.shutdown().await?;

    if failures > 0 {
        anyhow::bail!("{} of {} requests failed", failures, texts.len());
    }
    Ok(())
}

/// Load scenario: `count` identical submissions at once
pub async fn bench(ctx: &AppContext, text: &str, count: usize) -> anyhow::Result<()> {
    let report = run_bench(ctx, text, count).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    ctx.shutdown().await?;
    Ok(())
}

async fn submit_all(ctx: &AppContext, texts: &[String]) -> Vec<Result<ProcessResponse>> {
    let service = ctx.service();
    futures::future::join_all(texts.iter().map(|text| service.process_message(text))).await
}

fn render(result: &Result<ProcessResponse>) -> Value {
    match result {
        Ok(response) => json!(response),
        Err(e) => json!({ "error": ErrorBody::from(e) }),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchReport {
    requests: usize,
    succeeded: usize,
    /// Distinct digests observed; 1 when coalescing works
    distinct_digests: usize,
    elapsed_ms: u64,
    queue: coalesce_task::QueueStats,
}

async fn run_bench(ctx: &AppContext, text: &str, count: usize) -> BenchReport {
    info!(count, "Starting bench");
    let started = Instant::now();

    let texts = vec![text.to_string(); count];
    let results = submit_all(ctx, &texts).await;

    let mut digests: Vec<&str> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|r| r.digest.as_str())
        .collect();
    let succeeded = digests.len();
    digests.sort_unstable();
    digests.dedup();

    BenchReport {
        requests: count,
        succeeded,
        distinct_digests: digests.len(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        queue: ctx.service().health().queue,
    }
}
