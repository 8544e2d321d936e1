use std::path::Path;

use anyhow::{bail, Context as _};
use esg_chain::{InMemoryChain, RpcWallet, Wallet};
use esg_crypto::{Canonicalization, ContentHasher};
use esg_upload::UploadClient;
use esg_types::ContentId;
use esg_workflow::{Feed, FeedEvent, SessionHandle, Workflow, WorkflowError};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::cli::*;
use crate::config::EsgConfig;
use crate::render;

/// Resolved settings shared by every command.
struct Context {
    config: EsgConfig,
    format: OutputFormat,
    simulate: bool,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = EsgConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = Some(url);
    }
    if let Some(role) = cli.role {
        config.role = role;
    }
    let ctx = Context {
        config,
        format: cli.format,
        simulate: cli.simulate,
    };

    match cli.command {
        Command::Connect => cmd_connect(&ctx).await,
        Command::Fingerprint(args) => cmd_fingerprint(&ctx, args).await,
        Command::Register(args) => cmd_register(&ctx, args).await,
        Command::Feed(args) => cmd_feed(&ctx, args).await,
        Command::Attest(args) => cmd_attest(&ctx, args).await,
        Command::Status(args) => cmd_status(&ctx, args).await,
        Command::Balance => cmd_balance(&ctx).await,
        Command::Tiers(args) => cmd_tiers(&ctx, args),
        Command::Upload(args) => cmd_upload(&ctx, args).await,
    }
}

/// Pick the wallet for this run. `None` when neither a node nor the
/// simulator is configured; connecting then reports the missing wallet.
fn wallet(ctx: &Context) -> anyhow::Result<Option<Box<dyn Wallet>>> {
    if ctx.simulate {
        debug!("using simulated chain");
        return Ok(Some(Box::new(InMemoryChain::new())));
    }
    match &ctx.config.rpc_url {
        Some(url) => {
            debug!(url = %url, "using JSON-RPC wallet");
            Ok(Some(Box::new(RpcWallet::new(ctx.config.rpc_config(url))?)))
        }
        None => Ok(None),
    }
}

async fn connect(ctx: &Context) -> anyhow::Result<Workflow> {
    let wallet = wallet(ctx)?;
    let session = SessionHandle::new();
    session
        .connect(wallet.as_deref(), &ctx.config.deployment())
        .await?;
    Ok(Workflow::new(ctx.config.role, session))
}

async fn cmd_connect(ctx: &Context) -> anyhow::Result<()> {
    let workflow = connect(ctx).await?;
    let account = workflow
        .session()
        .account()
        .await
        .context("wallet returned no account")?;
    render::emit(
        ctx.format,
        &json!({ "account": account, "role": workflow.role() }),
        || render::account(&account),
    )
}

async fn cmd_fingerprint(ctx: &Context, args: FingerprintArgs) -> anyhow::Result<()> {
    let id = fingerprint(&args).await?;
    render::emit(ctx.format, &json!({ "id": id }), || render::fingerprint(&id))
}

async fn fingerprint(args: &FingerprintArgs) -> anyhow::Result<ContentId> {
    let mode = if args.sorted {
        Canonicalization::SortedKeys
    } else {
        Canonicalization::InsertionOrder
    };
    let hasher = ContentHasher::new(mode);
    let id = if let Some(path) = &args.file {
        hasher.fingerprint_str(&selected_file_name(path).await?)
    } else if let Some(path) = &args.contents {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        hasher.fingerprint_bytes(&bytes)
    } else if let Some(doc) = &args.json {
        let value: serde_json::Value = serde_json::from_str(doc).context("parsing JSON input")?;
        hasher.fingerprint_json(&value)?
    } else if let Some(text) = &args.text {
        hasher.fingerprint_str(text)
    } else {
        bail!("give text, --file, --contents, or --json to fingerprint");
    };
    Ok(id)
}

/// Name of an existing report file. Only the name is hashed, but a report
/// has to be selected before it can be registered.
async fn selected_file_name(path: &Path) -> anyhow::Result<String> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(WorkflowError::Validation(format!(
            "select a file first: {} is not a file",
            path.display()
        ))
        .into());
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

async fn cmd_register(ctx: &Context, args: RegisterArgs) -> anyhow::Result<()> {
    let name = selected_file_name(&args.file).await?;
    let workflow = connect(ctx).await?;
    let reg = workflow.register_file_name(&name).await?;
    render::emit(ctx.format, &reg, || render::registration(&reg, &ctx.config.explorer_tx_url))
}

async fn cmd_feed(ctx: &Context, args: FeedArgs) -> anyhow::Result<()> {
    let workflow = connect(ctx).await?;
    let interval = match args.interval {
        Some(secs) => std::time::Duration::from_secs(secs.max(1)),
        None => ctx.config.feed_interval(),
    };
    let feed = Feed::new(workflow, interval);
    let mut events = feed.subscribe();
    feed.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut registered = 0u64;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(FeedEvent::Registered(entry)) => {
                    render::emit_line(ctx.format, &entry, || render::feed_entry(&entry))?;
                    registered += 1;
                    if args.count.is_some_and(|n| registered >= n) {
                        break;
                    }
                }
                Ok(FeedEvent::Failed(message)) => {
                    render::emit_line(ctx.format, &json!({ "error": message }), || {
                        render::feed_failure(&message)
                    })?;
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "feed output lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => break,
        }
    }
    feed.stop();
    Ok(())
}

async fn cmd_attest(ctx: &Context, args: AttestArgs) -> anyhow::Result<()> {
    let workflow = connect(ctx).await?;
    let att = workflow.attest(&args.hash, args.pass, &args.reason).await?;
    render::emit(ctx.format, &att, || render::attestation(&att, &ctx.config.explorer_tx_url))
}

async fn cmd_status(ctx: &Context, args: StatusArgs) -> anyhow::Result<()> {
    let workflow = connect(ctx).await?;
    let status = workflow.query_status(&args.hash).await?;
    render::emit(ctx.format, &status, || render::status(args.hash.trim(), &status))
}

async fn cmd_balance(ctx: &Context) -> anyhow::Result<()> {
    let workflow = connect(ctx).await?;
    let report = workflow.check_balance().await?;
    render::emit(ctx.format, &report, || render::balance(&report, &ctx.config.token_symbol))
}

fn cmd_tiers(ctx: &Context, args: TiersArgs) -> anyhow::Result<()> {
    let tiers = esg_finance::tiers(args.balance);
    let credits = esg_finance::carbon_credits(args.balance);
    render::emit(
        ctx.format,
        &json!({ "balance": args.balance, "carbon_credits": credits, "tiers": tiers }),
        || {
            render::credits(args.balance, &credits);
            render::tiers(&tiers);
        },
    )
}

async fn cmd_upload(ctx: &Context, args: UploadArgs) -> anyhow::Result<()> {
    let client = UploadClient::new(ctx.config.upload_url.as_str())?;
    let outcome = client.upload_file(&args.file).await?;

    let saved = match (&args.qr_out, &outcome.qr) {
        (Some(path), Some(qr)) => {
            tokio::fs::write(path, &qr.bytes)
                .await
                .with_context(|| format!("writing QR code to {}", path.display()))?;
            Some(path.as_path())
        }
        (Some(_), None) => {
            warn!("backend returned no QR code");
            None
        }
        _ => None,
    };

    render::emit(
        ctx.format,
        &json!({
            "file_hash": outcome.file_hash,
            "transaction_link": outcome.transaction_link,
            "qr_code": saved.map(|p| p.display().to_string()),
        }),
        || render::upload(&outcome, saved),
    )
}
