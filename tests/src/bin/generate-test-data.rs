use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::{Duration, Utc};
use colloquy_api::{Comment, DocId, NewComment, Permission, Principal};
use colloquy_engine::{CommentManager, Config};
use colloquy_mock_repo::MockRepo;
use rand::{seq::SliceRandom, Rng};

const USERS: &[&str] = &["alice", "bob", "carol", "dave"];

const AREAS: &[&str] = &["domain", "sections", "templates"];
const TITLE_WORDS: usize = 4;
const COMMENT_WORDS: usize = 25;

/// Generates a repository filled with random comment threads, and prints it
/// as JSON on stdout
#[derive(structopt::StructOpt)]
struct Opt {
    /// Number of content documents to comment upon
    #[structopt(short, long, default_value = "10")]
    documents: usize,

    /// Number of comments and replies, spread across all documents
    #[structopt(short, long, default_value = "100")]
    comments: usize,

    /// Probability for a comment to be a reply rather than a new thread
    #[structopt(short, long, default_value = "0.6")]
    reply_ratio: f64,

    /// JSON comment manager configuration
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn gen_user(rng: &mut impl Rng) -> Principal {
    Principal::user(*USERS.choose(rng).unwrap_or(&USERS[0]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    }
    let opt = <Opt as structopt::StructOpt>::from_args();
    anyhow::ensure!(
        (0.0..=1.0).contains(&opt.reply_ratio),
        "reply ratio must be between 0 and 1, got {}",
        opt.reply_ratio
    );
    let config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut rng = rand::thread_rng();

    let repo = Arc::new(MockRepo::new());
    let manager = CommentManager::new(repo.clone(), repo.clone(), repo.clone(), repo.clone())
        .with_config(config);

    // Generate documents, readable by everyone
    let mut docs = Vec::new();
    for i in 0..opt.documents {
        let area = AREAS.choose(&mut rng).unwrap_or(&AREAS[0]);
        let path = match rng.gen_bool(0.2) {
            true => format!("/{area}-{i}"),
            false => format!("/{area}/ws/doc-{i}"),
        };
        let id = repo.add_content(&path, &lipsum::lipsum_words(TITLE_WORDS));
        repo.grant(id, colloquy_mock_repo::EVERYONE, Permission::Read);
        docs.push(id);
    }
    anyhow::ensure!(
        !docs.is_empty() || opt.comments == 0,
        "cannot generate comments without documents"
    );

    // Generate comments, each being either a new thread or a reply
    let start = Utc::now() - Duration::days(30);
    let mut comments: Vec<Comment> = Vec::new();
    for i in 0..opt.comments {
        let parent: DocId = match comments.choose(&mut rng) {
            Some(c) if rng.gen_bool(opt.reply_ratio) => c.id,
            _ => *docs.choose(&mut rng).context("picking a document")?,
        };
        let payload = NewComment {
            creation_date: Some(start + Duration::minutes(i as i64 * 17)),
            ..NewComment::new(lipsum::lipsum_words(COMMENT_WORDS))
        };
        let comment = manager
            .create_comment(&gen_user(&mut rng), parent, payload)
            .await
            .with_context(|| format!("creating comment {i} on {parent}"))?;
        tracing::debug!(id = ?comment.id, depth = comment.ancestor_ids.len(), "generated comment");
        comments.push(comment);
    }

    let dump = repo.test_dump()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).context("serializing repository dump")?
    );
    Ok(())
}
