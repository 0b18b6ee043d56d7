use std::env;
use std::error::Error;

use paranote::capability::unsigned_token;
use paranote::{ChapterSession, Credential, InMemoryCommentStore, ParanoteConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const FIRST_DRAFT: [&str; 3] = [
    "Alpha: the chapter opens on a quiet harbour at dawn.",
    "Beta: the fishing boats are already out past the breakwater.",
    "Gamma: a stranger walks down the pier carrying nothing at all.",
];

const SECOND_DRAFT: [&str; 4] = [
    "Prologue: a letter arrives three days too late.",
    "Gamma: a stranger walks down the pier carrying nothing at all.",
    "Alpha: the chapter opens on a quiet harbour at dawn.",
    "Delta: nobody on the quay admits to knowing him.",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cfg = match env::args().nth(1) {
        Some(path) => ParanoteConfig::from_file(path)?,
        None => ParanoteConfig::default(),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.logging.level))
        .with_target(false);
    if cfg.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let store = InMemoryCommentStore::default();
    let reader = Credential::bearer(unsigned_token(&json!({ "sub": "reader-1", "name": "Ada" })));

    let mut session = ChapterSession::from_config(&cfg)?;
    session.set_paragraphs(FIRST_DRAFT);

    let draft = session.draft_comment(2, "Who is he?")?;
    let root = session.post(&store, &reader, draft).await?;
    let reply = session.draft_reply(&root.id, "The harbourmaster's brother, surely.")?;
    session.post(&store, &reader, reply).await?;
    let draft = session.draft_comment(0, "Lovely opening.")?;
    session.post(&store, &reader, draft).await?;

    println!("first draft counts: {}", serde_json::to_string(session.counts())?);

    // The author rewrites the chapter; comments follow their paragraphs.
    let changed = session.set_paragraphs(SECOND_DRAFT);
    println!("document changed: {changed}");
    println!("second draft counts: {}", serde_json::to_string(session.counts())?);
    for placement in &session.resolution().placements {
        println!(
            "  {} recorded at {} now at {} ({:?})",
            placement.comment_id,
            placement.recorded_index,
            placement.resolved_index,
            placement.outcome
        );
    }

    if let Some(threads) = session.open(1) {
        println!(
            "paragraph 1 panel ({} comments):",
            session.header_count(1)
        );
        for thread in &threads {
            for node in thread.iter() {
                println!("  {}: {}", node.comment.display_name(), node.comment.content);
            }
        }
    }

    Ok(())
}
