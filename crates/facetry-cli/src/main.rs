use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use facetry::db::{category_repo, default_database_path, job_repo, prompt_repo};
use facetry::export::export_selected_with;
use facetry::generation::{DedupPolicy, GenerationOutcome, GenerationRequest, GenerationSettings};
use facetry::navigator::{global_search, level_options, MAX_LEVELS};
use facetry::prompts::DEFAULT_EXECUTION_ORDER;
use facetry::{
    import_file, load_or_default, update, Category, ClientContext, Cmd, Config, ConfigError,
    Database, FacetGenerator, FunctionsClient, Msg, NavigatorState, Orchestrator, PromptTemplate,
    QueuePersister, QueueStore, Result, ResultView, Role, SampleFacetGenerator, SelectionQueue,
    UpdateSettings,
};

#[derive(Parser, Debug)]
#[command(name = "facetry")]
#[command(author, version, about = "Category taxonomy and facet recommendation workflow")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, env = "FACETRY_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config)
    #[arg(long, env = "FACETRY_DATABASE")]
    database: Option<PathBuf>,

    #[arg(long, env = "FACETRY_USER", default_value = "local")]
    user: String,

    #[arg(long, env = "FACETRY_ROLE", default_value = "member")]
    role: Role,

    /// Client the user belongs to
    #[arg(long, env = "FACETRY_CLIENT")]
    client: Option<String>,

    /// Act on behalf of another client (super admins only)
    #[arg(long)]
    as_client: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import categories from a CSV file with a `breadcrumbs` column
    Import { file: PathBuf },

    /// List the options of the next level below a path
    Levels {
        /// Selected prefix, e.g. "Marine > Safety"
        path: Option<String>,
        #[arg(short, long, default_value = "")]
        filter: String,
    },

    /// Search full category paths
    Search {
        query: String,
        /// Only search below this prefix
        #[arg(long)]
        under: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Inspect or edit the selection queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },

    /// Manage prompt templates and client overrides
    Prompts {
        #[command(subcommand)]
        command: PromptCommand,
    },

    /// Generate facets for the queued categories
    Generate {
        /// Prompt id or name; repeat for several. Defaults to every active prompt
        #[arg(short, long = "prompt")]
        prompts: Vec<String>,
        /// Skip the duplicate check and always create a new job
        #[arg(long)]
        force: bool,
        /// Use canned facets instead of the backend
        #[arg(long)]
        sample: bool,
        #[arg(long)]
        name: Option<String>,
        /// Hierarchy depth sent as category context (0 = full path)
        #[arg(long, default_value = "0")]
        depth: usize,
    },

    /// List recent jobs
    Jobs {
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Show the facets of a job, grouped by category
    Facets { job_id: String },

    /// Export facets of a job to CSV
    Export {
        job_id: String,
        /// Export only these facets
        #[arg(long = "facet")]
        facets: Vec<String>,
        /// Export every facet of these categories
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Hide a category from the navigator
    Hide { category_id: String },

    /// Make a hidden category visible again
    Show { category_id: String },

    /// Invite a user to the active client
    Invite {
        email: String,
        #[arg(long, default_value = "member")]
        role: Role,
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Run a per-level analysis
    Analyze {
        level: u8,
        project_id: String,
        /// One category name per level
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum QueueCommand {
    Show,
    /// Add a category if absent, remove it if queued
    Toggle { category_id: String },
    /// Queue the category at a path, or everything below it with --all
    AddPath {
        path: String,
        #[arg(long)]
        all: bool,
    },
    Clear,
}

#[derive(Subcommand, Debug)]
enum PromptCommand {
    List,
    Add { name: String, content: String },
    /// Create any missing standard prompts with placeholder text
    Seed,
    /// Replace a template's content for the active client
    Override { template: String, content: String },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    let subscriber = Registry::default().with(layer.with_filter(filter));

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return;
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}

struct Session {
    config: Config,
    db: Database,
    ctx: ClientContext,
}

impl Session {
    fn open(args: &Args) -> Result<Self> {
        let config = load_or_default(args.config.as_deref())?;
        let path = args
            .database
            .clone()
            .or_else(|| config.database_path.clone())
            .or_else(default_database_path)
            .ok_or_else(|| ConfigError::Validation {
                message: "no database path configured and no home directory".to_string(),
            })?;
        let db = Database::open(&path)?;

        let mut ctx = ClientContext::new(args.user.clone(), args.role, args.client.clone());
        if let Some(other) = &args.as_client {
            ctx = ctx.impersonate(other.clone())?;
        }
        Ok(Self { config, db, ctx })
    }

    fn client_id(&self) -> Result<&str> {
        Ok(self.ctx.active_client()?)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        Ok(category_repo::list_for_client(&self.db, self.client_id()?)?)
    }

    fn persister(&self) -> QueuePersister {
        let store: Arc<dyn QueueStore> = Arc::new(self.db.clone());
        QueuePersister::new(store, self.ctx.user_id.clone(), self.config.queue.debounce())
    }

    fn navigator_settings(&self) -> UpdateSettings {
        UpdateSettings {
            auto_reset_after: self.config.navigator.auto_reset_after(),
        }
    }

    fn navigate(&self, categories: &[Category], msgs: Vec<Msg>) -> (NavigatorState, Vec<Cmd>) {
        let settings = self.navigator_settings();
        let mut state = NavigatorState::new();
        let mut cmds = Vec::new();
        for msg in msgs {
            let (next, cmd) = update(state, msg, categories, &settings);
            state = next;
            cmds.extend(cmd.into_vec());
        }
        (state, cmds)
    }
}

fn print_queue(queue: &SelectionQueue, categories: &[Category]) {
    if queue.is_empty() {
        println!("Queue is empty");
        return;
    }
    for id in queue.ids() {
        match categories.iter().find(|c| c.id == id) {
            Some(c) => println!("{}  {}", id, c.category_path),
            None => println!("{}  (unknown category)", id),
        }
    }
    println!("{} queued", queue.len());
}

async fn run_queue(session: &Session, command: QueueCommand) -> Result<()> {
    let categories = session.categories()?;
    let persister = session.persister();
    let mut queue = persister.restore().await?;

    let changed = match command {
        QueueCommand::Show => false,
        QueueCommand::Toggle { category_id } => {
            let queued = queue.toggle(&category_id);
            println!("{} {}", if queued { "Queued" } else { "Removed" }, category_id);
            true
        }
        QueueCommand::AddPath { path, all } => {
            let (_, cmds) = session.navigate(
                &categories,
                vec![Msg::PickSearchResult(path), Msg::AddSelectionToQueue],
            );
            let mut changed = false;
            for cmd in cmds {
                match cmd {
                    Cmd::Enqueue(id) => changed |= queue.add_all([id]) > 0,
                    Cmd::ConfirmBulkAdd { path, ids } if all => {
                        let added = queue.add_all(ids);
                        println!("Added {} categories below {}", added, path);
                        changed |= added > 0;
                    }
                    Cmd::ConfirmBulkAdd { path, ids } => {
                        println!(
                            "{} categories lie below {}; pass --all to queue them",
                            ids.len(),
                            path
                        );
                    }
                    Cmd::SetStatus(status) => println!("{}", status),
                    _ => {}
                }
            }
            changed
        }
        QueueCommand::Clear => {
            queue.clear();
            true
        }
    };

    if changed {
        persister.queue_changed(&queue);
        persister.flush().await?;
    }
    print_queue(&queue, &categories);
    Ok(())
}

fn run_prompts(session: &Session, command: PromptCommand) -> Result<()> {
    match command {
        PromptCommand::List => {
            let client = session.ctx.active_client().ok();
            for template in prompt_repo::list_active(&session.db)? {
                let version = match client {
                    Some(client) => prompt_repo::active_override(&session.db, client, &template.id)?
                        .map(|o| format!(" (override v{})", o.version)),
                    None => None,
                };
                println!("{}  {}{}", template.id, template.name, version.unwrap_or_default());
            }
        }
        PromptCommand::Add { name, content } => {
            let template = PromptTemplate::new(name, content);
            prompt_repo::insert(&session.db, &template)?;
            println!("Created prompt {}", template.id);
        }
        PromptCommand::Seed => {
            for name in DEFAULT_EXECUTION_ORDER {
                if prompt_repo::find_by_name(&session.db, name)?.is_some() {
                    continue;
                }
                let template = PromptTemplate::new(*name, format!("{} for the provided categories.", name));
                prompt_repo::insert(&session.db, &template)?;
                println!("Created prompt {}  {}", template.id, name);
            }
        }
        PromptCommand::Override { template, content } => {
            let id = resolve_prompt_id(&session.db, &template)?;
            let o = prompt_repo::upsert_override(&session.db, session.client_id()?, &id, &content)?;
            println!("Override v{} active for {}", o.version, template);
        }
    }
    Ok(())
}

/// Accepts a template id or name. Unknown values are returned as given so
/// validation can report them.
fn resolve_prompt_id(db: &Database, value: &str) -> Result<String> {
    if let Some(t) = prompt_repo::find_by_id(db, value)? {
        return Ok(t.id);
    }
    Ok(prompt_repo::find_by_name(db, value)?
        .map(|t| t.id)
        .unwrap_or_else(|| value.to_string()))
}

fn generator(session: &Session, sample: bool) -> Result<Arc<dyn FacetGenerator>> {
    if sample {
        return Ok(Arc::new(SampleFacetGenerator));
    }
    if session.config.backend.base_url.trim().is_empty() {
        warn!("No backend configured; using sample facets");
        return Ok(Arc::new(SampleFacetGenerator));
    }
    Ok(Arc::new(FunctionsClient::from_config(&session.config.backend)?))
}

fn functions_client(session: &Session) -> Result<FunctionsClient> {
    Ok(FunctionsClient::from_config(&session.config.backend)?)
}

async fn run_generate(
    session: &Session,
    prompts: Vec<String>,
    force: bool,
    sample: bool,
    name: Option<String>,
    depth: usize,
) -> Result<()> {
    let prompt_ids = if prompts.is_empty() {
        prompt_repo::list_active(&session.db)?
            .into_iter()
            .map(|t| t.id)
            .collect()
    } else {
        prompts
            .iter()
            .map(|p| resolve_prompt_id(&session.db, p))
            .collect::<Result<Vec<_>>>()?
    };

    let orchestrator = Orchestrator::new(
        session.db.clone(),
        generator(session, sample)?,
        GenerationSettings::from(&session.config),
    );
    let persister = session.persister();
    let mut queue = persister.restore().await?;

    let request = GenerationRequest {
        prompt_ids,
        context_depth: depth,
        name,
        metadata: None,
    };
    let policy = if force {
        DedupPolicy::ForceNew
    } else {
        DedupPolicy::Check
    };

    match orchestrator
        .generate(&session.ctx, &mut queue, request, policy)
        .await?
    {
        GenerationOutcome::Duplicate { job } => {
            println!(
                "An identical job already completed: {} ({})",
                job.id,
                job.completed_at.as_deref().unwrap_or(job.created_at.as_str())
            );
            println!("Run `facetry facets {}` to view it, or pass --force to generate again", job.id);
        }
        GenerationOutcome::Completed { job, facets } => {
            persister.queue_changed(&queue);
            persister.flush().await?;
            info!(job_id = %job.id, "Job completed");
            println!("Job {} completed with {} facets", job.id, facets.len());
        }
    }
    Ok(())
}

fn run_facets(session: &Session, job_id: &str) -> Result<()> {
    let orchestrator = Orchestrator::new(
        session.db.clone(),
        Arc::new(SampleFacetGenerator),
        GenerationSettings::from(&session.config),
    );
    let (job, facets) = orchestrator.load_existing(&session.ctx, job_id)?;
    let categories = session.categories()?;
    println!("Job {}  [{}]", job.id, job.status);

    let view = ResultView::new(facets);
    for group in view.groups() {
        let label = categories
            .iter()
            .find(|c| c.id == group.category_id)
            .map(|c| c.category_path.as_str())
            .unwrap_or(group.category_id.as_str());
        println!("\n{}", label);
        for f in &group.facets {
            println!(
                "  {:>3}. {:<24} {:<6} conf {:>2}  fill {:>5.1}%  {}",
                f.sort_order,
                f.facet_name,
                f.priority,
                f.confidence_score,
                f.filling_percentage,
                f.possible_values
            );
        }
    }
    Ok(())
}

fn run_export(
    session: &Session,
    job_id: &str,
    facet_ids: &[String],
    category_ids: &[String],
    out: &Path,
) -> Result<()> {
    let orchestrator = Orchestrator::new(
        session.db.clone(),
        Arc::new(SampleFacetGenerator),
        GenerationSettings::from(&session.config),
    );
    let (job, facets) = orchestrator.load_existing(&session.ctx, job_id)?;
    let mut view = ResultView::new(facets);
    if facet_ids.is_empty() && category_ids.is_empty() {
        view.set_all_selected(true);
    }
    for id in category_ids {
        view.set_tab_selected(id, true);
    }
    for id in facet_ids {
        if !view.is_selected(id) {
            view.toggle(id);
        }
    }

    let categories = session.categories()?;
    let artifact = export_selected_with(
        &session.db,
        &session.ctx,
        &job,
        &view,
        &categories,
        &session.config.export.columns,
    )?;
    let path = artifact.write_to(out)?;
    println!("Wrote {} rows to {}", view.selected_count(), path.display());
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let session = Session::open(&args)?;

    match args.command {
        Command::Import { file } => {
            let report = import_file(&session.db, session.client_id()?, &file)?;
            println!(
                "Imported {} categories ({} skipped, {} failed)",
                report.inserted, report.skipped, report.failed
            );
            for e in &report.errors {
                println!("  {}", e);
            }
        }

        Command::Levels { path, filter } => {
            let categories = session.categories()?;
            let mut msgs = Vec::new();
            if let Some(path) = path {
                msgs.push(Msg::PickSearchResult(path));
            }
            let (state, _) = session.navigate(&categories, msgs);
            let level = state.active_depth() + 1;
            if level > MAX_LEVELS {
                println!("Deepest level reached");
                return Ok(());
            }
            let settings = session.navigator_settings();
            let (state, _) = update(state, Msg::SetFilter { level, text: filter }, &categories, &settings);
            for option in level_options(&categories, &state, level) {
                println!("{}", option);
            }
        }

        Command::Search { query, under, limit } => {
            let categories = session.categories()?;
            let mut msgs = Vec::new();
            if let Some(prefix) = under {
                msgs.push(Msg::PickSearchResult(prefix));
            }
            msgs.push(Msg::SetGlobalSearch(query));
            let (state, _) = session.navigate(&categories, msgs);
            let limit = limit.unwrap_or(session.config.navigator.search_limit);
            for c in global_search(&categories, &state, limit) {
                println!("{}  {}", c.id, c.category_path);
            }
        }

        Command::Queue { command } => run_queue(&session, command).await?,

        Command::Prompts { command } => run_prompts(&session, command)?,

        Command::Generate {
            prompts,
            force,
            sample,
            name,
            depth,
        } => run_generate(&session, prompts, force, sample, name, depth).await?,

        Command::Jobs { limit } => {
            for job in job_repo::list_for_client(&session.db, session.client_id()?, limit)? {
                println!(
                    "{}  {:<10} {:>3}%  {}  {}",
                    job.id,
                    job.status,
                    job.progress,
                    job.created_at,
                    job.name.as_deref().unwrap_or("")
                );
            }
        }

        Command::Facets { job_id } => run_facets(&session, &job_id)?,

        Command::Export {
            job_id,
            facets,
            categories,
            out,
        } => run_export(&session, &job_id, &facets, &categories, &out)?,

        Command::Hide { category_id } => {
            category_repo::set_visibility(&session.db, session.client_id()?, &category_id, false)?;
            println!("Hidden {}", category_id);
        }

        Command::Show { category_id } => {
            category_repo::set_visibility(&session.db, session.client_id()?, &category_id, true)?;
            println!("Visible {}", category_id);
        }

        Command::Invite { email, role, name } => {
            let client = functions_client(&session)?;
            client
                .invite_user(&email, role, session.client_id()?, &name)
                .await?;
            println!("Invitation sent to {}", email);
        }

        Command::Analyze {
            level,
            project_id,
            names,
        } => {
            let client = functions_client(&session)?;
            let response = client.analyze_level(level, &project_id, &names).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&response.meta).unwrap_or_default()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.log_json);

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
