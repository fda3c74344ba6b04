use std::{process, sync::Arc};

use pagecopy::{
    application::{
        archive::CopyArchive,
        editor::{ContentEditor, UpdateSectionsCommand},
        error::AppError,
        repos::ContentStore,
    },
    cache::{CacheConfig, ContentCache, PageCatalog, SectionKind},
    config::{self, Settings},
    infra::{redis_store::RedisStore, telemetry},
    sanitize::sanitize,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        config::Command::Sanitize(args) => run_sanitize(args).await,
        config::Command::Show(args) => run_show(&settings, args).await,
        config::Command::Set(args) => run_set(&settings, args).await,
        config::Command::Export(args) => run_export(&settings, args).await,
        config::Command::Import(args) => run_import(&settings, args).await,
    }
}

struct Services {
    store: Arc<dyn ContentStore>,
    cache: Arc<ContentCache>,
    editor: ContentEditor,
}

async fn connect(settings: &Settings) -> Result<Services, AppError> {
    let store: Arc<dyn ContentStore> =
        Arc::new(RedisStore::connect(&settings.store.redis_url).await?);
    let catalog = PageCatalog::new(settings.content.pages.iter().cloned());
    let cache = Arc::new(ContentCache::new(
        Arc::clone(&store),
        catalog,
        CacheConfig::from(settings),
    ));
    let editor = ContentEditor::new(Arc::clone(&store), Arc::clone(&cache));

    info!(
        pages = cache.catalog().len(),
        ttl_secs = settings.cache.ttl.as_secs(),
        "Content store connected"
    );

    Ok(Services {
        store,
        cache,
        editor,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let encoded = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{encoded}");
    Ok(())
}

async fn run_show(settings: &Settings, args: config::ShowArgs) -> Result<(), AppError> {
    let services = connect(settings).await?;

    match args.page {
        Some(page_id) => {
            if !services.cache.catalog().contains(&page_id) {
                return Err(AppError::validation(format!(
                    "page `{page_id}` is not part of the page catalog"
                )));
            }
            let page = services.cache.get_page(&page_id).await?;
            print_json(&page)
        }
        None => {
            let snapshot = services.cache.get_snapshot().await?;
            print_json(&*snapshot)
        }
    }
}

async fn run_set(settings: &Settings, args: config::SetArgs) -> Result<(), AppError> {
    let kind = if args.metadata {
        SectionKind::Metadata
    } else {
        SectionKind::Content
    };
    let command = UpdateSectionsCommand::from_assignments(args.page, kind, &args.sections)?;

    let services = connect(settings).await?;
    let page = services.editor.update_sections(command).await?;
    print_json(&page)
}

async fn run_sanitize(args: config::SanitizeArgs) -> Result<(), AppError> {
    let raw = match args.file {
        Some(path) => tokio::fs::read_to_string(&path).await.map_err(|err| {
            AppError::validation(format!("failed to read `{}`: {err}", path.display()))
        })?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map_err(|err| AppError::unexpected(format!("failed to read stdin: {err}")))?;
            buffer
        }
    };

    println!("{}", sanitize(Some(&raw)));
    Ok(())
}

async fn run_export(settings: &Settings, args: config::ExportArgs) -> Result<(), AppError> {
    let services = connect(settings).await?;
    let archive = CopyArchive::gather(services.store.as_ref(), services.cache.catalog()).await?;
    archive.write(&args.file)?;

    info!(
        path = %args.file.display(),
        pages = archive.pages.len(),
        "Page copy exported"
    );
    Ok(())
}

async fn run_import(settings: &Settings, args: config::ImportArgs) -> Result<(), AppError> {
    let commands = CopyArchive::read(&args.file)?.into_commands();
    if commands.is_empty() {
        return Err(AppError::validation(format!(
            "archive `{}` contains no page sections",
            args.file.display()
        )));
    }

    let services = connect(settings).await?;
    let written = commands.len();
    let snapshot = services.editor.apply(commands).await?;
    let populated = snapshot
        .pages()
        .filter(|(_, content)| !content.is_empty())
        .count();

    info!(
        path = %args.file.display(),
        tables = written,
        pages = snapshot.len(),
        populated,
        "Page copy imported"
    );
    Ok(())
}
