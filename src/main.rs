mod analysis;
mod metrics;
mod models;
mod report;
mod scraper;
mod utils;

use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Result, WrapErr, bail};
use log::{error, info};

use crate::analysis::{AnalysisReport, Analyzer};
use crate::report::card::{ScoreCardAssembler, trending_list};
use crate::report::compare::comparison_table;
use crate::report::export::{write_csv, write_json};
use crate::scraper::github::GitHubScraper;
use crate::scraper::orchestrator::FetchOrchestrator;
use crate::scraper::package::PackageScraper;
use crate::utils::cli::Args;
use crate::utils::clock::{Clock, FixedClock, SystemClock};
use crate::utils::config::config;
use crate::utils::log::Logger;
use crate::utils::repo_ref::RepoRef;

type RepoAnalyzer = Analyzer<GitHubScraper, PackageScraper>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    info!(
        "starting repo-health {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).magenta()
    );

    let config = config(args.config.clone())
        .wrap_err_with(|| format!("failed to load config from {}", args.config.display()))?;
    let github = Arc::new(
        GitHubScraper::new(config.clone()).wrap_err("failed to build the github client")?,
    );

    if let Some(language) = args.trending_language() {
        let trending = github
            .get_trending(language)
            .await
            .wrap_err("failed to fetch trending repositories")?;
        println!("{}", trending_list(&trending));

        if args.repos.is_empty() && !args.interactive {
            return Ok(());
        }
    }

    let targets = args
        .repos
        .iter()
        .map(|input| input.parse::<RepoRef>())
        .collect::<Result<Vec<_>>>()?;

    if targets.is_empty() && !args.interactive {
        bail!("no repositories given, pass owner/repo arguments or use --interactive");
    }

    let clock: Arc<dyn Clock> = match args.as_of {
        Some(as_of) => {
            info!("evaluating freshness windows as of {}", as_of.to_rfc3339());
            Arc::new(FixedClock::new(as_of))
        }
        None => Arc::new(SystemClock),
    };

    let packages = Arc::new(
        PackageScraper::new(config.clone()).wrap_err("failed to build the package registry client")?,
    );
    let analyzer = Arc::new(Analyzer::new(
        FetchOrchestrator::new(github, packages),
        clock,
        config.cache.ttl(),
    ));

    let mut reports = analyze_all(&analyzer, targets).await?;

    for report in &reports {
        println!("{}", ScoreCardAssembler::new(report).assemble());
    }
    if reports.len() > 1 {
        println!("{}", comparison_table(&as_refs(&reports)));
    }

    if args.interactive {
        interactive(&analyzer, &mut reports).await?;
    }

    if let Some(path) = &args.json
        && !reports.is_empty()
    {
        write_json(path, &as_refs(&reports)).await?;
    }
    if let Some(path) = &args.csv
        && !reports.is_empty()
    {
        write_csv(path, &as_refs(&reports)).await?;
    }

    Ok(())
}

fn as_refs(reports: &[Arc<AnalysisReport>]) -> Vec<&AnalysisReport> {
    reports.iter().map(Arc::as_ref).collect()
}

/// Analyzes every target concurrently. Failed repositories are reported and
/// skipped; it is only an error when none succeed.
async fn analyze_all(
    analyzer: &Arc<RepoAnalyzer>,
    targets: Vec<RepoRef>,
) -> Result<Vec<Arc<AnalysisReport>>> {
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    info!("analyzing {} repositories (parallel)", targets.len());

    let mut tasks = Vec::with_capacity(targets.len());
    for target in targets {
        let analyzer = Arc::clone(analyzer);
        tasks.push(tokio::spawn(async move {
            let result = analyzer.analyze(&target.owner, &target.repo).await;
            (target, result)
        }));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    let mut failures = 0;
    for task in tasks {
        match task.await? {
            (_, Ok(report)) => reports.push(report),
            (target, Err(e)) => {
                error!("{}: {}", target, e);
                failures += 1;
            }
        }
    }

    if reports.is_empty() {
        bail!("all {} repositories failed to analyze", failures);
    }

    Ok(reports)
}

async fn interactive(analyzer: &RepoAnalyzer, session: &mut Vec<Arc<AnalysisReport>>) -> Result<()> {
    println!("\n{}", "=== Interactive Mode ===".cyan().bold());
    println!(
        "{}\n",
        "Enter owner/repo or a GitHub URL. 'compare' compares this session, an empty line quits."
            .cyan()
    );

    loop {
        print!("{}", "repository> ".cyan());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        match input {
            "" | "quit" | "exit" => break,
            "compare" => {
                if session.len() < 2 {
                    println!("{}", "Analyze at least two repositories first.".yellow());
                } else {
                    println!("{}", comparison_table(&as_refs(session)));
                }
                continue;
            }
            _ => {}
        }

        let target = match input.parse::<RepoRef>() {
            Ok(target) => target,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        match analyzer.analyze(&target.owner, &target.repo).await {
            Ok(report) => {
                println!("{}", ScoreCardAssembler::new(&report).assemble());
                if !session.iter().any(|r| Arc::ptr_eq(r, &report)) {
                    session.push(report);
                }
            }
            Err(e) => println!("{}", format!("✗ {}: {}", target, e).red()),
        }
    }

    info!("interactive session ended with {} repositories", session.len());
    Ok(())
}
