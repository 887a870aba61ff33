//! `spotlight search` and `spotlight open`.

use anyhow::Context;
use serde_json::json;

use super::SessionArgs;
use crate::config::{config_dir, Config};
use crate::core::item::SearchableItem;
use crate::core::search::SearchOutcome;
use crate::error::{SpotlightError, SpotlightResult};
use crate::events::Command;
use crate::executor::{self, ExecutionAction};
use crate::overlay::{Overlay, Reaction};
use crate::services::browser::SnapshotHost;
use crate::services::document::StaticDocument;
use crate::services::i18n::{ChromeLabels, LocaleDir};
use crate::session::SearchSession;
use crate::settings::{load_or_default, JsonSettingsStore};

/// Page used when no capture is given.
const BLANK_PAGE: &str = "about:blank";

struct Workspace {
    overlay: Overlay,
    doc: StaticDocument,
    host: SnapshotHost,
}

fn prepare(args: &SessionArgs, mut config: Config) -> anyhow::Result<Workspace> {
    if let Some(profile) = args.profile {
        config.general.profile = profile;
    }

    let host = SnapshotHost::load(&args.sources)
        .with_context(|| format!("loading sources from {}", args.sources.display()))?
        .with_history_window(config.history_window());

    let doc = match &args.page {
        Some(path) => StaticDocument::load(path)
            .with_context(|| format!("loading page from {}", path.display()))?,
        None => StaticDocument::new(BLANK_PAGE, ""),
    };

    let settings = load_or_default(&JsonSettingsStore::at_default_path());
    let messages = LocaleDir::new(config_dir().join("_locales"));
    let overlay = Overlay::new(config, settings, Box::new(messages));

    Ok(Workspace { overlay, doc, host })
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?)
}

pub fn run_search(args: &SessionArgs, config: Config, as_json: bool) -> anyhow::Result<()> {
    let Workspace {
        mut overlay,
        doc,
        host,
    } = prepare(args, config)?;

    runtime()?.block_on(overlay.open(&doc, &host));
    overlay.set_query(&args.query);

    let session = overlay
        .session()
        .context("search session did not become ready")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(session))?);
    } else {
        print_outcome(session, overlay.labels());
    }
    Ok(())
}

pub fn run_open(args: &SessionArgs, config: Config, pick: Option<usize>) -> anyhow::Result<()> {
    let Workspace {
        mut overlay,
        doc,
        host,
    } = prepare(args, config)?;
    let rt = runtime()?;

    let dispatched = rt.block_on(async {
        overlay.open(&doc, &host).await;
        overlay.set_query(&args.query);

        let fallback = match overlay.session().map(|s| s.outcome()) {
            Some(SearchOutcome::NoResults { fallback_url, .. }) => Some(fallback_url.clone()),
            _ => None,
        };
        if let Some(url) = fallback {
            let action = ExecutionAction::OpenUrl { url };
            let ok = executor::execute(&action, &host).await;
            overlay.close();
            return Reaction::Executed { action, ok };
        }

        if let Some(rank) = pick {
            let index = rank.saturating_sub(1);
            if overlay.run(Command::SelectAt(index), &doc, &host).await == Reaction::Ignored {
                println!("No result at rank {}", rank);
                return Reaction::Ignored;
            }
        }
        overlay.run(Command::Activate, &doc, &host).await
    });
    report(&dispatched);

    for request in host.requests() {
        tracing::info!("Host request: {:?}", request);
    }
    check_dispatch(&dispatched)?;
    Ok(())
}

/// A request the host rejected becomes an error, so the process exits
/// non-zero.
fn check_dispatch(reaction: &Reaction) -> SpotlightResult<()> {
    match reaction {
        Reaction::Executed { action, ok: false } => Err(SpotlightError::Host(format!(
            "{:?} was rejected",
            action
        ))),
        _ => Ok(()),
    }
}

fn report(reaction: &Reaction) {
    match reaction {
        Reaction::Executed { action, ok } => {
            let status = if *ok { "ok" } else { "failed" };
            match action {
                ExecutionAction::ScrollToElement { handle } => {
                    println!("Scroll to node {} ({})", handle.node.0, status)
                }
                ExecutionAction::SwitchTab { tab_id, window_id } => {
                    println!("Switch to tab {} in window {} ({})", tab_id, window_id, status)
                }
                ExecutionAction::Dismiss => println!("Already on this page"),
                ExecutionAction::OpenUrl { url } => println!("Open {} ({})", url, status),
                ExecutionAction::CopyToClipboard { content, .. } => {
                    println!("Copy {} ({})", content, status)
                }
            }
        }
        _ => println!("Nothing to open"),
    }
}

fn item_line(rank: usize, item: &SearchableItem, labels: &ChromeLabels) -> String {
    let mut line = format!("{:>2}. {} {}  [{}]", rank, item.icon, item.title, item.kind());
    if !item.display_url.is_empty() {
        line.push_str(&format!("  {}", item.display_url));
    }
    if item.is_current_site {
        line.push_str(&format!("  ({})", labels.this_site));
    }
    line
}

fn print_outcome(session: &SearchSession, labels: &ChromeLabels) {
    match session.outcome() {
        SearchOutcome::Prompt => {
            println!("{}", labels.type_to_search);
            println!("{}", labels.empty_hint);
            if !session.recent().is_empty() {
                println!();
                println!("{}:", labels.recent);
                for (i, item) in session.recent().iter().enumerate() {
                    println!("{}", item_line(i + 1, item, labels));
                }
            }
        }
        SearchOutcome::TypeMore { .. } => println!("{}", labels.type_more),
        SearchOutcome::NoResults {
            query,
            fallback_url,
        } => {
            println!("{}", labels.no_results);
            println!("{} \"{}\": {}", labels.search_google, query, fallback_url);
        }
        SearchOutcome::Results { .. } => {
            for (i, item) in session.result_items().into_iter().enumerate() {
                println!("{}", item_line(i + 1, item, labels));
                if !item.content.is_empty() {
                    println!("      {}", item.content);
                }
            }
        }
    }
}

fn outcome_json(session: &SearchSession) -> serde_json::Value {
    let results: Vec<serde_json::Value> = session
        .results()
        .iter()
        .filter_map(|c| {
            let item = session.items().get(c.item)?;
            Some(json!({
                "item": item,
                "score": c.score,
                "matches": c.matches,
            }))
        })
        .collect();

    json!({
        "query": session.query(),
        "outcome": session.outcome(),
        "results": results,
        "recent": session.recent(),
    })
}
