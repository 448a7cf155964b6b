use clap::Parser;
use log::*;
use std::sync::Arc;

use npm_changelog_bot::{
    Result,
    cache::{ChangelogCache, backend::DirStore},
    cli,
    forge::{github::Github, traits::Forge},
    orchestrator::{Orchestrator, PullRequestContext},
    registry::NpmRegistry,
    report,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("npm_changelog_bot")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = cli::Args::parse();

    initialize_logger(args.debug)?;

    let remote = args.get_remote()?;
    let forge = Arc::new(Github::new(remote.clone())?);
    let registry =
        Arc::new(NpmRegistry::new(args.registry_url.clone(), args.npm_token()));
    let cache = Arc::new(ChangelogCache::new(args.pull_number));
    let backend = Arc::new(DirStore::new(&args.cache_dir));

    let context = PullRequestContext {
        owner: remote.owner.clone(),
        repo: remote.repo.clone(),
        number: args.pull_number,
        head_ref: args.head_ref.clone(),
    };

    let orchestrator = Orchestrator::new(
        forge.clone(),
        registry,
        cache,
        backend,
        context,
        args.lockfile_path.clone(),
    );

    let rows = orchestrator.run().await?;

    if rows.is_empty() {
        info!("no package updates detected");
        return Ok(());
    }

    let comment = report::render_comment(&rows);

    if args.dry_run {
        println!("{comment}");
        return Ok(());
    }

    forge
        .replace_comment(&remote.owner, &remote.repo, args.pull_number, &comment)
        .await?;

    Ok(())
}
