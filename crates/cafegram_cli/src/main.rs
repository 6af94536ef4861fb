//! `cafegram` command-line entry point.
//!
//! # Responsibility
//! - Drive the core catalog for manual testing without a GUI shell.
//! - Map every core error to `Error: ...` on stderr and exit status 1.

mod args;

use args::{CafeFields, Cli, Commands};
use cafegram_core::db::{open_db, DbError};
use cafegram_core::{
    check_in_message, init_logging, recommend, CafeCatalog, CafeEdit, CafeId, CafeRecord,
    CafeRepository, CatalogError, ConfigError, CoreConfig, MemoryCafeRepository, NewCafe,
    RecommendError, Recommendation, ReminderScheduler, SqliteCafeRepository,
};
use clap::Parser;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Catalog(CatalogError),
    Recommend(RecommendError),
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "{message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Recommend(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Recommend(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<CatalogError> for CliError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RecommendError> for CliError {
    fn from(value: RecommendError) -> Self {
        Self::Recommend(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// JSON/text projection of a record; image bytes are summarized by size.
#[derive(Serialize)]
struct CafeView<'a> {
    id: CafeId,
    name: &'a str,
    category: &'a str,
    location: &'a str,
    phone: Option<&'a str>,
    summary: Option<&'a str>,
    rating: Option<&'a str>,
    is_visited: bool,
    image_bytes: Option<usize>,
}

impl<'a> From<&'a CafeRecord> for CafeView<'a> {
    fn from(record: &'a CafeRecord) -> Self {
        Self {
            id: record.id,
            name: &record.name,
            category: &record.category,
            location: &record.location,
            phone: record.phone.as_deref(),
            summary: record.summary.as_deref(),
            rating: record.rating.as_deref(),
            is_visited: record.is_visited,
            image_bytes: record.image.as_ref().map(Vec::len),
        }
    }
}

#[derive(Serialize)]
struct ReminderView<'a> {
    cafe_id: CafeId,
    identifier: &'a str,
    category: &'a str,
    title: &'a str,
    subtitle: &'a str,
    body: &'a str,
    delay_secs: u64,
    actions: Vec<&'static str>,
    call_url: Option<String>,
}

/// Stand-in for a platform notification center; the command prints the reminder.
struct StdoutScheduler;

impl ReminderScheduler for StdoutScheduler {
    fn schedule(&mut self, recommendation: &Recommendation) -> Result<(), String> {
        info!(
            "event=reminder_schedule module=cli status=ok cafe_id={}",
            recommendation.cafe_id
        );
        Ok(())
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn records(&self, records: &[CafeRecord]) -> Result<(), CliError> {
        if self.json {
            let views: Vec<CafeView<'_>> = records.iter().map(CafeView::from).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
            return Ok(());
        }
        if records.is_empty() {
            println!("No cafes.");
        }
        for record in records {
            let mark = if record.is_visited { "x" } else { " " };
            println!("[{mark}] {}  {}  {}", record.id, record.name, record.location);
        }
        Ok(())
    }

    fn record(&self, record: &CafeRecord) -> Result<(), CliError> {
        let view = CafeView::from(record);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }
        println!("id:       {}", view.id);
        println!("name:     {}", view.name);
        println!("category: {}", view.category);
        println!("location: {}", view.location);
        println!("phone:    {}", view.phone.unwrap_or("-"));
        println!("summary:  {}", view.summary.unwrap_or("-"));
        println!("rating:   {}", view.rating.unwrap_or("-"));
        println!("visited:  {}", if view.is_visited { "yes" } else { "no" });
        match view.image_bytes {
            Some(len) => println!("image:    {len} bytes"),
            None => println!("image:    -"),
        }
        Ok(())
    }

    fn reminder(&self, reminder: &Recommendation, call_url: Option<String>) -> Result<(), CliError> {
        if self.json {
            let view = ReminderView {
                cafe_id: reminder.cafe_id,
                identifier: reminder.identifier,
                category: reminder.category,
                title: &reminder.title,
                subtitle: &reminder.subtitle,
                body: &reminder.body,
                delay_secs: reminder.delay.as_secs(),
                actions: reminder.actions.iter().map(|action| action.identifier()).collect(),
                call_url,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }
        println!("{} (in {}s)", reminder.title, reminder.delay.as_secs());
        println!("{}", reminder.subtitle);
        println!("{}", reminder.body);
        for action in reminder.actions {
            println!("  [{}] {}", action.identifier(), action.title());
        }
        if let Some(url) = call_url {
            println!("call: {url}");
        }
        Ok(())
    }

    fn text(&self, text: &str) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string(text)?);
        } else {
            println!("{text}");
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = CoreConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, &dir.to_string_lossy()).map_err(CliError::Logging)?;
    }

    let output = Output { json: cli.json };
    if cli.in_memory {
        let mut catalog = CafeCatalog::load(MemoryCafeRepository::new())?;
        return execute(&mut catalog, cli.command, &config, &output);
    }

    let mut conn = open_db(&config.db_path)?;
    let mut catalog = CafeCatalog::load(SqliteCafeRepository::new(&mut conn))?;
    execute(&mut catalog, cli.command, &config, &output)
}

fn execute<R: CafeRepository>(
    catalog: &mut CafeCatalog<R>,
    command: Commands,
    config: &CoreConfig,
    output: &Output,
) -> Result<(), CliError> {
    match command {
        Commands::List => output.records(catalog.records()),
        Commands::Add { name, fields } => {
            let image = read_image(fields.image.as_deref())?;
            let record = catalog.add(NewCafe {
                name,
                category: fields.category.unwrap_or_default(),
                location: fields.location.unwrap_or_default(),
                image,
                phone: fields.phone,
                summary: fields.summary,
            })?;
            output.record(&record)
        }
        Commands::Edit {
            id,
            name,
            fields,
            clear_image,
        } => {
            let current = catalog.get(id).ok_or(CatalogError::NotFound(id))?;
            let edit = merge_edit(current, name, fields, clear_image)?;
            let record = catalog.update(id, edit)?;
            output.record(&record)
        }
        Commands::Remove { id } => {
            let removed = catalog.remove(id)?;
            output.text(&format!("Removed {}", removed.name))
        }
        Commands::Visit { id } => {
            let record = catalog.toggle_visited(id)?;
            output.record(&record)
        }
        Commands::Rate { id, rating } => {
            let record = catalog.rate(id, rating)?;
            output.record(&record)
        }
        Commands::Search { query } => output.records(&catalog.search(&query)),
        Commands::Show { id } => {
            let record = catalog.get(id).ok_or(CatalogError::NotFound(id))?;
            output.record(record)
        }
        Commands::Recommend { delay, respond } => {
            let delay = delay.map_or(config.reminder_delay, Duration::from_secs);
            let reminder = recommend(catalog, &mut StdoutScheduler, delay)?;
            let call_url = respond.and_then(|action| reminder.respond(&action));
            output.reminder(&reminder, call_url)
        }
        Commands::Share { id } => {
            let record = catalog.get(id).ok_or(CatalogError::NotFound(id))?;
            output.text(&check_in_message(record))
        }
    }
}

fn merge_edit(
    current: &CafeRecord,
    name: Option<String>,
    fields: CafeFields,
    clear_image: bool,
) -> Result<CafeEdit, CliError> {
    let image = if clear_image {
        None
    } else {
        match read_image(fields.image.as_deref())? {
            Some(bytes) => Some(bytes),
            None => current.image.clone(),
        }
    };
    Ok(CafeEdit {
        name: name.unwrap_or_else(|| current.name.clone()),
        category: fields.category.unwrap_or_else(|| current.category.clone()),
        location: fields.location.unwrap_or_else(|| current.location.clone()),
        image,
        phone: fields.phone.or_else(|| current.phone.clone()),
        summary: fields.summary.or_else(|| current.summary.clone()),
    })
}

fn read_image(path: Option<&Path>) -> Result<Option<Vec<u8>>, CliError> {
    path.map(|path| {
        std::fs::read(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    })
    .transpose()
}
