use std::{future::IntoFuture, process, sync::Arc};

use inkwell::{
    application::{
        authors::AuthorService,
        comments::CommentService,
        error::AppError,
        feed::FeedService,
        follow::FollowService,
        groups::GroupService,
        posts::PostService,
        repos::{
            AuthorsRepo, CommentsRepo, FollowsRepo, GroupsRepo, HealthRepo, PostsRepo,
            PostsWriteRepo,
        },
    },
    cache::{CacheConfig, FeedCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, HttpState},
        telemetry,
    },
};
use tokio::{sync::watch, try_join};
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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (http_state, admin_state) = build_states(repositories, &settings);
    serve_http(&settings, http_state, admin_state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target: "inkwell::migrate", "migrations applied");
    Ok(())
}

async fn connect(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or(InfraError::MissingSetting {
            key: "database.url",
        })?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let pool = connect(settings).await?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_states(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> (HttpState, AdminState) {
    let authors_repo: Arc<dyn AuthorsRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let cache = Arc::new(FeedCache::new(&CacheConfig::from(&settings.cache)));
    let feed = Arc::new(FeedService::new(
        authors_repo.clone(),
        groups_repo.clone(),
        posts_repo.clone(),
        follows_repo.clone(),
        cache,
        u64::from(settings.feed.page_size.get()),
    ));
    let authors = Arc::new(AuthorService::new(authors_repo.clone()));
    let groups = Arc::new(GroupService::new(groups_repo.clone()));
    let posts = Arc::new(PostService::new(
        posts_repo.clone(),
        posts_write_repo,
        groups_repo,
        comments_repo.clone(),
    ));
    let comments = Arc::new(CommentService::new(posts_repo, comments_repo));
    let follow = Arc::new(FollowService::new(authors_repo, follows_repo));

    let http_state = HttpState {
        feed: feed.clone(),
        follow,
        posts,
        comments,
        groups: groups.clone(),
        authors: authors.clone(),
        health: health_repo.clone(),
        identity_header: settings.auth.identity_header.clone(),
    };
    let admin_state = AdminState {
        authors,
        groups,
        feed,
        health: health_repo,
    };

    (http_state, admin_state)
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
        target: "inkwell::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
        .into_future();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .into_future();

    let servers = async { try_join!(public_server, admin_server) };
    tokio::pin!(servers);

    tokio::select! {
        result = &mut servers => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
            info!(target: "inkwell::serve", "shutdown requested; draining connections");
            let _ = shutdown_tx.send(true);
        }
    }

    match tokio::time::timeout(settings.server.graceful_shutdown, servers).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        Err(_) => warn!(
            target: "inkwell::serve",
            grace_seconds = settings.server.graceful_shutdown.as_secs(),
            "graceful shutdown timed out; dropping open connections"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
