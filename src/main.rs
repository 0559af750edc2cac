use std::{process, sync::Arc};

use pageless::{
    application::{
        batch::BatchService,
        error::AppError,
        footer::{AssetUrls, FooterInjector},
        options::OptionsService,
        registry::ScriptRegistry,
        repos::{OptionsRepo, PostsRepo},
        script::{fetch_url_template, generate_script},
    },
    config,
    domain::{
        error::DomainError,
        hash::{ConfigHash, script_file_name},
        routing::ViewContext,
    },
    infra::{
        error::InfraError,
        http::{self, AdminState, HttpState},
        memory::{ArchivePosts, InMemoryOptions},
        options_file::TomlOptionsFile,
        telemetry,
    },
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Activate(_) => run_activate(settings).await,
        config::Command::Script(args) => run_script(settings, args).await,
        config::Command::Hash(args) => run_hash(settings, args).await,
    }
}

async fn open_options(settings: &config::Settings) -> Result<OptionsService, AppError> {
    let store: Arc<dyn OptionsRepo> = match settings.options.file.as_ref() {
        Some(path) => Arc::new(
            TomlOptionsFile::open(path)
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?,
        ),
        None => {
            warn!(
                target = "pageless::bootstrap",
                "no options file configured; options live in memory until restart"
            );
            Arc::new(InMemoryOptions::default())
        }
    };

    Ok(OptionsService::new(store, settings.options.namespace.clone()))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let options = open_options(&settings).await?;
    options.activate().await?;

    let archive = ArchivePosts::load(&settings.site.archive)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "pageless::bootstrap",
        archive = %settings.site.archive.display(),
        posts = archive.len(),
        "post archive loaded"
    );
    let posts: Arc<dyn PostsRepo> = Arc::new(archive);

    let registry = Arc::new(ScriptRegistry::new(settings.registry.capacity));
    let injector = Arc::new(FooterInjector::new(
        registry.clone(),
        AssetUrls {
            jquery_url: settings.site.jquery_url.clone(),
            asset_base_url: settings.site.asset_base_url(),
            script_base_url: settings.site.base_url.clone(),
        },
    ));

    let http_state = HttpState {
        batches: Arc::new(BatchService::new(posts, options.clone())),
        injector,
        registry,
        base_url: settings.site.base_url.clone(),
    };
    let admin_state = AdminState { options };

    serve_http(&settings, http_state, admin_state).await
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "pageless::bootstrap",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target = "pageless::bootstrap", "shutdown requested"),
        Err(err) => error!(
            target = "pageless::bootstrap",
            error = %err,
            "failed to listen for shutdown signal"
        ),
    }
}

async fn run_activate(settings: config::Settings) -> Result<(), AppError> {
    let options = open_options(&settings).await?;
    let seeded = options.activate().await?;

    if seeded.is_empty() {
        println!("all options already set");
    } else {
        for key in seeded {
            println!(
                "seeded {} = {}",
                key.storage_key(options.namespace()),
                key.default_value()
            );
        }
    }
    Ok(())
}

async fn run_script(settings: config::Settings, args: config::ScriptArgs) -> Result<(), AppError> {
    let options = open_options(&settings).await?;
    let config = options.resolve_config().await?;
    let context = args.routing_context().map_err(DomainError::from)?;

    let fetch_template = fetch_url_template(&settings.site.base_url, &context);
    let script = generate_script(
        &config,
        &ViewContext::Listing(context),
        &settings.site.asset_base_url(),
        &fetch_template,
    )
    .map_err(|err| AppError::unexpected(err.to_string()))?
    .ok_or(AppError::NotFound)?;

    println!("{}", script.body);
    Ok(())
}

async fn run_hash(settings: config::Settings, args: config::ScriptArgs) -> Result<(), AppError> {
    let options = open_options(&settings).await?;
    let config = options.resolve_config().await?;
    let context = args.routing_context().map_err(DomainError::from)?;

    let hash = ConfigHash::compute(&config, &context);
    println!("{hash}\t{}", script_file_name(&hash));
    Ok(())
}
