//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, Mailer, PostRepository, TagRepository};
use quill_infra::{ConsoleMailer, InMemoryBlog};

#[cfg(feature = "postgres")]
use quill_infra::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    database::connect,
};

#[cfg(feature = "smtp")]
use quill_infra::SmtpMailer;

use crate::config::{AppConfig, SiteConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub templates: Arc<tera::Tera>,
    pub site: SiteConfig,
}

type Repos = (
    Arc<dyn PostRepository>,
    Arc<dyn CommentRepository>,
    Arc<dyn TagRepository>,
);

/// One shared in-memory store backing all three repository ports.
fn memory_repos() -> Repos {
    tracing::warn!("Running without database - content lives in memory only");
    let store = Arc::new(InMemoryBlog::new());
    (store.clone(), store.clone(), store)
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (posts, comments, tags): Repos = {
            if let Some(db_config) = &config.database {
                match connect(db_config).await {
                    Ok(db) => {
                        let db = Arc::new(db);
                        (
                            Arc::new(PostgresPostRepository::new(db.clone())),
                            Arc::new(PostgresCommentRepository::new(db.clone())),
                            Arc::new(PostgresTagRepository::new(db)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        memory_repos()
                    }
                }
            } else {
                memory_repos()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (posts, comments, tags): Repos = memory_repos();

        let mailer = Self::build_mailer(config);

        // Template parse errors are fatal at startup.
        let templates = crate::templates::build().expect("failed to parse templates");

        tracing::info!("Application state initialized");

        Self {
            posts,
            comments,
            tags,
            mailer,
            templates: Arc::new(templates),
            site: config.site.clone(),
        }
    }

    #[cfg(feature = "smtp")]
    fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
        if let Some(smtp) = &config.smtp {
            match SmtpMailer::new(smtp) {
                Ok(mailer) => return Arc::new(mailer),
                Err(e) => {
                    tracing::error!("Invalid SMTP configuration: {}. Using console mailer.", e);
                }
            }
        } else {
            tracing::warn!("SMTP_HOST not set - outgoing mail goes to the log");
        }
        Arc::new(ConsoleMailer)
    }

    #[cfg(not(feature = "smtp"))]
    fn build_mailer(_config: &AppConfig) -> Arc<dyn Mailer> {
        Arc::new(ConsoleMailer)
    }
}
