//! Job tracker CLI
//!
//! Signs in against the tracking service and prints application timelines,
//! trends, analytics and the resume.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use jobtrack::{
    error::{AppError, Result},
    models::{
        ApplicationStatus, Config, DateRange, ExportFormat, ExportRequest, ExportTaskStatus,
        LoginCredentials, SectionType, TrendWindow, UpdateStatusRequest,
    },
    pipeline::{distribution_slices, format_duration, overview},
    services::{ApiClient, AuthApi, ExportApi, ReqwestTransport, SessionManager, SystemClock},
    storage::LocalStorage,
    store::{ApplicationStore, ResumeStore, StatusTrackingStore},
};

/// jobtrack - job application tracker client
#[derive(Parser, Debug)]
#[command(name = "jobtrack", version, about = "Job application tracker client")]
struct Cli {
    /// Directory holding config.toml and the persisted session
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Sign in and persist the session
    Login {
        username: String,

        /// Read from stdin when neither the flag nor the variable is set
        #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List all applications
    List,

    /// Show the status timeline of an application
    History {
        id: u64,

        /// Print the normalized history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move an application to a new status
    SetStatus {
        id: u64,
        status: ApplicationStatus,
        #[arg(long)]
        note: Option<String>,
    },

    /// Show daily status trends
    Trends {
        /// week, month or quarter (default from config)
        #[arg(long)]
        window: Option<TrendWindow>,
    },

    /// Show status analytics
    Analytics {
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Export applications and save the file into the storage directory
    Export {
        #[arg(long, default_value = "xlsx")]
        format: ExportFormat,

        /// Seconds to wait for the export before giving up
        #[arg(long, default_value_t = 300)]
        max_wait: u64,
    },

    /// Show or edit the resume
    Resume {
        #[command(subcommand)]
        action: Option<ResumeAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ResumeAction {
    /// Print completeness, sections and attachments
    Show,

    /// Replace one section with a JSON document
    SetSection { section: SectionType, content: String },

    /// Upload a file as an attachment
    Attach { path: PathBuf },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    init_logging(cli.verbose, &config.logging.level);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", config_path.display());
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }
    config.validate()?;

    let transport = Arc::new(ReqwestTransport::new(&config.api)?);
    let session = Arc::new(SessionManager::new(
        transport.clone(),
        Arc::new(SystemClock),
        Arc::new(LocalStorage::new(&cli.storage_dir)),
        config.session.clone(),
    ));
    session.init().await?;
    let client = Arc::new(ApiClient::new(transport, Arc::clone(&session), &config.api));

    match cli.command {
        Command::Validate => {}

        Command::Login { username, password } => {
            let password = read_password(password, std::io::stdin().lock())?;
            let user = session
                .login(&LoginCredentials {
                    username,
                    password,
                    remember_me: true,
                })
                .await?;
            println!("Signed in as {}", user.username);
        }

        Command::Logout => {
            session.logout().await?;
            println!("Signed out");
        }

        Command::Whoami => {
            require_session(&session).await?;
            let auth = AuthApi::new(Arc::clone(&client));
            if session.should_validate().await && !auth.validate_token().await? {
                return Err(AppError::unauthorized("登录已过期，请重新登录"));
            }
            let user = auth.profile().await?;
            println!("{} <{}>", user.username, user.email);
        }

        Command::List => {
            require_session(&session).await?;
            let store = ApplicationStore::new(Arc::clone(&client));
            for app in store.fetch_all(true).await? {
                println!(
                    "{:>6}  {:<12}  {} / {}  ({})",
                    app.id, app.status, app.company_name, app.position_title, app.application_date
                );
            }
        }

        Command::History { id, json } => {
            require_session(&session).await?;
            let store = StatusTrackingStore::new(Arc::clone(&client), config.api.max_concurrent);
            if json {
                let history = store.fetch_status_history(id, true).await?;
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for item in store.timeline(id).await? {
                    let marker = if item.is_current { "*" } else { " " };
                    println!(
                        "{} {}  {:<12}  {}",
                        marker,
                        item.timestamp,
                        item.status,
                        format_duration(item.duration)
                    );
                }
            }
        }

        Command::SetStatus { id, status, note } => {
            require_session(&session).await?;
            let store = StatusTrackingStore::new(Arc::clone(&client), config.api.max_concurrent);
            let mut request = UpdateStatusRequest::new(status);
            if let Some(note) = note {
                request = request.with_note(note);
            }
            let history = store.update_application_status(id, &request).await?;
            println!("Current stage: {}", history.summary.current_stage);
        }

        Command::Trends { window } => {
            require_session(&session).await?;
            let window = window.unwrap_or(config.trends.default_window);
            let store = StatusTrackingStore::new(Arc::clone(&client), config.api.max_concurrent);
            for point in store.fetch_status_trends(window).await? {
                println!(
                    "{}  total {:>4}  success {:>5.1}%",
                    point.date,
                    point.total_applications,
                    point.success_rate * 100.0
                );
            }
        }

        Command::Analytics {
            start_date,
            end_date,
        } => {
            require_session(&session).await?;
            let store = StatusTrackingStore::new(Arc::clone(&client), config.api.max_concurrent);
            let analytics = store
                .fetch_analytics(true, &DateRange {
                    start_date,
                    end_date,
                })
                .await?;

            let summary = overview(&analytics);
            println!(
                "Total {}  active {}  success {:.1}%  average cycle {} days",
                summary.total,
                summary.active,
                summary.success_rate,
                summary.average_cycle_days
            );
            for slice in distribution_slices(&analytics) {
                println!("  {:<12} {:>4}  {:>6.2}%", slice.status, slice.count, slice.percentage);
            }
        }

        Command::Export { format, max_wait } => {
            require_session(&session).await?;
            let export = ExportApi::new(Arc::clone(&client));
            let task = export
                .start(&ExportRequest {
                    format,
                    ..ExportRequest::default()
                })
                .await?;
            log::info!("Export task {} started", task.task_id);

            let task = export
                .wait_for(task, Duration::from_secs(1), Duration::from_secs(max_wait))
                .await?;
            if task.status != ExportTaskStatus::Completed {
                let reason = task.error_message.unwrap_or_else(|| format!("{:?}", task.status));
                return Err(AppError::api(500, format!("export failed: {reason}")));
            }

            let file = export.download(&task.task_id).await?;
            let path = cli.storage_dir.join(&file.filename);
            tokio::fs::write(&path, &file.bytes).await?;
            println!("Saved {}", path.display());
        }

        Command::Resume { action } => {
            require_session(&session).await?;
            let store = ResumeStore::new(Arc::clone(&client));
            let resume = store.fetch_my_resume().await?;

            match action.unwrap_or(ResumeAction::Show) {
                ResumeAction::Show => {
                    println!("{} ({}%, {})", resume.title, resume.completeness, resume.privacy);
                    for (section, content) in store.sections().await {
                        println!("  {:<8} {}", section, content);
                    }
                    for attachment in store.attachments().await {
                        println!(
                            "  [{}] {} {}",
                            attachment.id,
                            attachment.file_name,
                            attachment.url.unwrap_or_default()
                        );
                    }
                }
                ResumeAction::SetSection { section, content } => {
                    let content: serde_json::Value = serde_json::from_str(&content)?;
                    store.upsert_section(section, content).await?;
                    let completeness = store.resume().await.map(|r| r.completeness);
                    println!("Saved {} ({}%)", section, completeness.unwrap_or_default());
                }
                ResumeAction::Attach { path } => {
                    let filename = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .ok_or_else(|| AppError::validation("attachment path has no file name"))?
                        .to_string();
                    let bytes = tokio::fs::read(&path).await?;
                    let attachment = store.upload_attachment(&filename, None, bytes).await?;
                    println!("Uploaded {} ({})", attachment.file_name, attachment.id);
                }
            }
        }
    }

    Ok(())
}

/// Password from the flag or environment, else one line of `input`.
fn read_password(given: Option<String>, mut input: impl BufRead) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    Ok(password.to_string())
}

async fn require_session(session: &SessionManager) -> Result<()> {
    if session.is_authenticated().await {
        Ok(())
    } else {
        Err(AppError::unauthorized("not signed in; run `jobtrack login` first"))
    }
}
