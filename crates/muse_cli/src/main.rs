use clap::Parser;
use chrono::Utc;
use muse_core::config::{SiteOptions, UserPreferences};
use muse_core::{Article, ArticleStore, DocumentReader, PdfReader, Result, Summary};
use muse_inference::pipeline::write_summary_mirror;
use muse_inference::SummaryPipeline;
use muse_scraper::logging::init_logging;
use muse_scraper::metadata::extract_metadata;
use muse_scraper::navigation::NavigationConfig;
use muse_scraper::prelude::*;
use muse_web::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch the latest journal issues and summarize their articles", long_about = None)]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, default_value = "downloads/articles.db")]
    db: PathBuf,
    /// Storage backend: sqlite or memory
    #[arg(long, global = true, default_value = "sqlite")]
    storage: String,
    #[arg(long, global = true, default_value = "downloads")]
    downloads: PathBuf,
    #[arg(long, global = true, default_value = "summaries")]
    summaries: PathBuf,
    /// Exported session cookies (JSON array)
    #[arg(long, global = true, default_value = "cookies.json")]
    cookies: PathBuf,
    /// User preferences (JSON); every configured journal when absent
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,
    /// Site catalogue override (JSON); Project MUSE when absent
    #[arg(long, global = true)]
    sites: Option<PathBuf>,
    #[arg(long, global = true, default_value = "gemini", help = "Model to use for summaries. Available models: gemini (default), ollama, dummy")]
    model: String,
    #[arg(long, global = true)]
    model_name: Option<String>,
    #[arg(long, global = true)]
    model_url: Option<String>,
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download new articles, summarize them and store a combined summary
    Run {
        /// Repeat with this interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Summarize a single PDF and print the review
    Summarize {
        pdf: PathBuf,
        /// Journal name used when storing and mirroring
        #[arg(long, default_value = "Unknown Journal")]
        journal: String,
        /// Also store the article and its summary
        #[arg(long)]
        store: bool,
    },
    /// Serve the stored articles and summaries as JSON
    Serve {
        #[arg(long, default_value = "127.0.0.1:3001")]
        addr: String,
    },
    /// List the configured journals
    Journals,
}

impl Cli {
    fn inference_config(&self) -> muse_inference::Config {
        muse_inference::Config {
            model: self.model.clone(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
            api_key: self.api_key.clone(),
        }
    }

    fn site(&self) -> Result<SiteOptions> {
        match &self.sites {
            Some(path) => SiteOptions::from_file(path),
            None => Ok(default_site()),
        }
    }

    fn preferences(&self) -> Result<UserPreferences> {
        match &self.preferences {
            Some(path) => UserPreferences::from_file(path),
            None => Ok(UserPreferences::default()),
        }
    }

    async fn storage(&self) -> Result<Arc<dyn ArticleStore>> {
        let storage = muse_storage::create_storage(&self.storage, &self.db).await?;
        info!("💾 Storage initialized (using {})", self.storage);
        Ok(storage)
    }

    fn pipeline(&self, reader: Arc<dyn DocumentReader>) -> Result<SummaryPipeline> {
        let model = muse_inference::create_model(&self.inference_config())?;
        info!("🧠 Inference model initialized (using {})", model.name());
        Ok(SummaryPipeline::new(model, reader))
    }
}

async fn open_session(cli: &Cli) -> Result<ChromiumSession> {
    let session = ChromiumSession::launch(&BrowserOptions {
        headless: cli.headless,
        ..BrowserOptions::default()
    })
    .await?;
    if let Some(cookies) = load_cookies(&cli.cookies)? {
        session.add_cookies(&cookies).await?;
    }
    Ok(session)
}

async fn run_once(cli: &Cli, manager: &AcquisitionManager, pipeline: &SummaryPipeline) -> Result<RunReport> {
    let session = open_session(cli).await?;
    Ok(manager.run(&session, pipeline).await)
}

async fn run(cli: &Cli, interval: Option<HumanDuration>) -> Result<()> {
    let storage = cli.storage().await?;
    let reader: Arc<dyn DocumentReader> = Arc::new(PdfReader::new());
    let pipeline = cli.pipeline(reader.clone())?;
    let site = cli.site()?;
    let config = AcquisitionConfig {
        downloads_dir: cli.downloads.clone(),
        summaries_dir: cli.summaries.clone(),
        preferences: cli.preferences()?,
        navigation: NavigationConfig::default(),
        ..AcquisitionConfig::default()
    };
    let manager = AcquisitionManager::new(storage, reader, site, config);
    info!("🦗 Acquiring from {}", manager.site().name);

    let Some(interval) = interval else {
        let report = run_once(cli, &manager, &pipeline).await?;
        println!(
            "Downloaded {} articles ({} already stored, {} failed), summarized {}",
            report.acquisition.downloaded.len(),
            report.acquisition.skipped,
            report.acquisition.failed,
            report.summarized
        );
        return Ok(());
    };

    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
    loop {
        info!("Starting acquisition cycle");
        if let Err(e) = run_once(cli, &manager, &pipeline).await {
            warn!("Error during run: {}", e);
        }
        info!("Waiting {}s before next run", interval.0.as_secs());
        tokio::time::sleep(interval.0).await;
    }
}

async fn summarize(cli: &Cli, pdf: &Path, journal: &str, store: bool) -> Result<()> {
    let reader: Arc<dyn DocumentReader> = Arc::new(PdfReader::new());
    let pipeline = cli.pipeline(reader.clone())?;
    let result = pipeline.summarize(pdf).await?;
    println!("{}", result.markdown);

    if !store {
        return Ok(());
    }

    let storage = cli.storage().await?;
    let file_path = pdf.to_string_lossy().to_string();
    let article = match storage.get_article(&file_path).await? {
        Some(article) => article,
        None => {
            let metadata = match reader.first_page_text(pdf) {
                Ok(text) => extract_metadata(&text),
                Err(e) => {
                    warn!("Could not read first page of {}: {}", pdf.display(), e);
                    Default::default()
                }
            };
            let stem = pdf
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let article = Article {
                file_path: file_path.clone(),
                title: if metadata.title.is_empty() { stem } else { metadata.title },
                authors: metadata.authors,
                journal: journal.to_string(),
                download_date: Utc::now(),
                year: metadata.year,
                volume: metadata.volume,
                issue: metadata.issue,
                journal_issue: metadata.journal_issue,
            };
            storage.insert_article(&article).await?;
            article
        }
    };
    storage
        .upsert_summary(&Summary {
            file_path,
            summary: result.summary.clone(),
            markdown: Some(result.markdown),
            created_at: Utc::now(),
        })
        .await?;
    let mirror = write_summary_mirror(&cli.summaries, &article, &result.summary)?;
    info!("💾 Stored summary for {} ({})", article.title, mirror.display());
    Ok(())
}

async fn serve(cli: &Cli, addr: &str) -> Result<()> {
    let storage = cli.storage().await?;
    muse_web::serve(AppState::new(storage), addr).await
}

fn list_journals(cli: &Cli) -> Result<()> {
    let site = cli.site()?;
    println!("{} ({})", site.name, site.base_url);
    for journal in &site.journal_links {
        println!("  {:<40} {}", journal.name, journal.href);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Run { interval } => run(&cli, *interval).await,
        Commands::Summarize { pdf, journal, store } => summarize(&cli, pdf, journal, *store).await,
        Commands::Serve { addr } => serve(&cli, addr).await,
        Commands::Journals => list_journals(&cli),
    };
    if let Err(e) = &result {
        tracing::error!("❌ {}", e);
    }
    result
}
