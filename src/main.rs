mod api;
mod cli;
mod config;
mod guard;
mod journal;
mod logging;
mod session;
mod views;

use anyhow::Result;
use api::{ApiClient, UreqTransport};
use clap::Parser;
use session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "jobdesk", about = "Terminal client for the job portal")]
pub struct Args {
    #[arg(short = 'c', long, help = "Run one command and exit (e.g. \"/open /profile\")")]
    pub command: Option<String>,

    #[arg(long, env = "JOBDESK_BASE_URL", help = "Backend base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Where the session is remembered between runs")]
    pub session_file: Option<PathBuf>,

    #[arg(long, help = "Activity journal directory")]
    pub journal_dir: Option<PathBuf>,

    #[arg(long, help = "Answer yes to confirmations in -c mode")]
    pub yes: bool,

    #[arg(long, help = "Verbose output (log at info)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (log HTTP requests)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    if let Some(base_url) = &args.base_url {
        cfg.api.base_url = base_url.clone();
    }
    if let Some(path) = &args.session_file {
        cfg.session.path = Some(path.clone());
    }
    if let Some(dir) = &args.journal_dir {
        cfg.journal.dir = Some(dir.clone());
    }

    if let Err(errors) = cfg.validate() {
        for e in &errors {
            eprintln!("Config error {}", e);
        }
        anyhow::bail!("invalid configuration ({} problem(s))", errors.len());
    }

    logging::init(&logging::effective_level(
        &cfg.log.level,
        args.verbose,
        args.debug,
    ));
    debug!(base_url = %cfg.api.base_url, timeout_ms = cfg.api.timeout_ms, "configuration loaded");

    let storage: Box<dyn SessionStorage> = match cfg.session_path() {
        Some(path) => {
            debug!(path = %path.display(), "session storage");
            Box::new(FileStorage::new(path))
        }
        None => {
            warn!("no home directory; the session will not be remembered");
            Box::new(MemoryStorage::new())
        }
    };
    let mut store = SessionStore::new(storage);
    store.restore();
    let session = store.shared();

    let root = std::env::current_dir()?;
    let run_id = uuid::Uuid::new_v4().to_string();
    let journal = if cfg.journal.enabled {
        let dir = cfg.journal_dir(&root);
        match journal::Journal::open(&dir, &run_id) {
            Ok(journal) => journal,
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "journal disabled");
                journal::Journal::disabled(&run_id)
            }
        }
    } else {
        journal::Journal::disabled(&run_id)
    };
    let journal = journal.shared();

    let transport = UreqTransport::new(Duration::from_millis(cfg.api.timeout_ms));
    let client = ApiClient::for_session(
        &cfg.api.base_url,
        Box::new(transport),
        session.clone(),
        Some(journal.clone()),
    );

    let ctx = cli::Context::new(args, cfg, session, client, journal);

    if let Some(line) = ctx.args.command.clone() {
        cli::run_once(&ctx, &line)
    } else {
        cli::run_repl(ctx)
    }
}
