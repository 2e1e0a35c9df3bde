mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::{OptionExt, ResultExt};
use gallery_catalog::format::{format_file_size, format_timestamp};
use gallery_catalog::{
    CatalogSource, CatalogView, Credentials, Filter, LocalFile, MediaType, RepoSettings, Session, SystemClock,
    UploadEvent, UploadRequest, ViewState, fetch_catalog, login, upload_all,
};
use gallery_config::Config;
use gallery_remote::StoreHandle;
use gallery_remote::backend::{Endpoints, GithubStore, ReadOnlyStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,gallery=info,gallery_catalog=info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Configuration loaded");
    let credentials = credentials(&config, cli.username)?;
    match cli.command {
        Command::Login { dry_run } => {
            let store = store(&config, dry_run)?;
            let session = start_session(&store, &config, credentials).await?;
            let identity = session.identity();
            println!("Logged in as {} ({})", identity.display_name, identity.login);
            println!("Gallery repository: {} (branch {})", session.repository(), session.branch());
        },
        Command::Upload { media_type, dry_run, files } => {
            let store = store(&config, dry_run)?;
            let session = start_session(&store, &config, credentials).await?;
            upload_files(&store, &session, &config, media_type, files).await?;
        },
        Command::List { filter } => {
            let store = store(&config, false)?;
            let session = start_session(&store, &config, credentials).await?;
            list(&store, &session, filter).await?;
        },
    }
    Ok(())
}

fn credentials(config: &Config, username: Option<String>) -> Result<Credentials> {
    let username = username
        .or_else(|| config.github.username.clone())
        .ok_or_raise(|| ErrorKind::MissingSetting("github.username"))?;
    let token = config.github.token.clone().ok_or_raise(|| ErrorKind::MissingSetting("github.token"))?;
    Ok(Credentials::new(username, token))
}

fn store(config: &Config, dry_run: bool) -> Result<StoreHandle> {
    let endpoints = Endpoints {
        api: config.github.api_base.clone(),
        raw: config.github.raw_base.clone(),
        web: config.github.web_base.clone(),
    };
    let timeout = Duration::from_secs(config.github.timeout_secs);
    let github: StoreHandle = Arc::new(GithubStore::new("github", endpoints, timeout).or_raise(|| ErrorKind::Remote)?);
    if dry_run {
        tracing::info!("Dry run: nothing will be written to the remote");
        return Ok(Arc::new(ReadOnlyStore::new(github)));
    }
    Ok(github)
}

async fn start_session(store: &StoreHandle, config: &Config, credentials: Credentials) -> Result<Session> {
    let settings = RepoSettings {
        name: config.repository.name.clone(),
        description: config.repository.description.clone(),
        branch: config.repository.branch.clone(),
    };
    login(store, credentials, &settings).await.or_raise(|| ErrorKind::Login)
}

async fn upload_files(
    store: &StoreHandle,
    session: &Session,
    config: &Config,
    media_type: MediaType,
    paths: Vec<PathBuf>,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(LocalFile::from_path(&path).await.or_raise(|| ErrorKind::Upload)?);
    }
    let request = UploadRequest::new(files, media_type).with_max_file_size(config.upload.max_file_size);
    let clock = SystemClock::new();
    let uploaded = upload_all(store, session, &clock, request, |event| match event {
        UploadEvent::Started { total } => eprintln!("Uploading {total} file(s) as {media_type}"),
        UploadEvent::Uploading { index, total, filename } => eprintln!("[{index}/{total}] {filename}"),
        UploadEvent::Uploaded { path, .. } => println!("{path}"),
        UploadEvent::Complete => {},
    })
    .await
    .or_raise(|| ErrorKind::Upload)?;
    eprintln!("Done: {} file(s) uploaded", uploaded.len());
    Ok(())
}

async fn list(store: &StoreHandle, session: &Session, filter: Filter) -> Result<()> {
    let mut view = CatalogView::new();
    let catalog = match fetch_catalog(store, session).await {
        Ok(catalog) => catalog,
        Err(err) => {
            view.mark_unavailable();
            tracing::error!(error = %*err, state = ?view.state(), "Catalog refresh failed");
            return Err(err.raise(ErrorKind::Fetch));
        },
    };
    let counts: Vec<String> =
        catalog.counts().iter().map(|(media_type, count)| format!("{count} {media_type}")).collect();
    view.set_catalog(catalog);
    match view.source() {
        Some(CatalogSource::Fallback) => eprintln!("note: tree listing failed; listed each folder instead"),
        Some(CatalogSource::PartialFallback { failed }) => {
            let folders: Vec<&str> = failed.iter().map(MediaType::folder).collect();
            eprintln!("warning: could not list {}; those files are missing below", folders.join(", "));
        },
        Some(CatalogSource::Tree) | None => {},
    }
    if view.state() == ViewState::Empty {
        eprintln!("The gallery is empty");
        return Ok(());
    }
    eprintln!("Gallery: {}", counts.join(", "));
    let records = view.filter(filter);
    if records.is_empty() {
        eprintln!("No {filter} media in the gallery");
        return Ok(());
    }
    for record in records {
        let size = if record.size_known() { format_file_size(record.size) } else { "-".to_string() };
        println!(
            "{}  {:<5}  {:>10}  {}  {}",
            format_timestamp(record.created_at),
            record.media_type.as_str(),
            size,
            record.display_name,
            record.download_url
        );
    }
    Ok(())
}
