use auto_at::config::load_settings;
use auto_at::directory::{GroupId, MemberDirectory, OneBotClient};
use auto_at::error::{AutoAtError, Result};
use auto_at::message::{MentionRewriter, OutgoingMessage, RewriteOutcome, Segment};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let group_id = std::env::args()
        .nth(1)
        .map(GroupId::new)
        .ok_or_else(|| AutoAtError::Config("usage: auto-at <group_id>".to_string()))?;

    let settings = load_settings()?;
    tracing::info!(
        api_url = %settings.onebot.api_url,
        ttl_secs = settings.cache.ttl_secs,
        "Configuration loaded"
    );

    let client = OneBotClient::new(&settings.onebot)?;
    let directory = Arc::new(MemberDirectory::with_ttl(settings.cache.ttl()));
    let rewriter = MentionRewriter::new(directory.clone());

    tracing::info!(group_id = %group_id, "Reading replies from stdin");

    tokio::select! {
        result = run(&rewriter, &client, &group_id) => {
            result?;
            tracing::info!("Input closed");
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    directory.log_stats();
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("auto_at=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Rewrite each stdin line as a group reply and print the resulting chain as JSON
async fn run(rewriter: &MentionRewriter, client: &OneBotClient, group_id: &GroupId) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let mut message = OutgoingMessage::group(group_id.clone(), vec![Segment::text(line)]);

        match rewriter.rewrite(&mut message, client).await {
            RewriteOutcome::Rewritten { mentions, .. } => {
                tracing::debug!(mentions = mentions, "Reply rewritten");
            }
            outcome => tracing::debug!(outcome = ?outcome, "Reply left unchanged"),
        }

        let mut out = serde_json::to_vec(&message.chain)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}
