use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use driver::database::SqliteDatabase;
use error_stack::Report;
use kernel::KernelError;
use std::env::VarError;
use std::ops::Deref;
use std::sync::Arc;
use vodca::References;

static SECRET_KEY: &str = "SECRET_KEY";
const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init().await?)))
    }

    #[cfg(test)]
    pub fn with(handler: Handler) -> Self {
        Self(Arc::new(handler))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

impl FromRef<AppModule> for Key {
    fn from_ref(module: &AppModule) -> Self {
        module.cookie_key().clone()
    }
}

#[derive(References)]
pub struct Handler {
    database: SqliteDatabase,
    cookie_key: Key,
}

impl Handler {
    pub async fn init() -> error_stack::Result<Self, KernelError> {
        let database = SqliteDatabase::new().await?;
        let cookie_key = cookie_key()?;

        Ok(Self {
            database,
            cookie_key,
        })
    }

    #[cfg(test)]
    pub fn new(database: SqliteDatabase, cookie_key: Key) -> Self {
        Self {
            database,
            cookie_key,
        }
    }
}

fn cookie_key() -> error_stack::Result<Key, KernelError> {
    match dotenvy::var(SECRET_KEY) {
        Ok(secret) if secret.len() >= MIN_SECRET_LEN => Ok(Key::derive_from(secret.as_bytes())),
        Ok(_) => Err(Report::new(KernelError::Internal).attach_printable(format!(
            "{SECRET_KEY} must be at least {MIN_SECRET_LEN} bytes long"
        ))),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => {
            tracing::warn!("{SECRET_KEY} is not set, signing cookies with a throwaway key");
            Ok(Key::generate())
        }
        Err(error) => Err(Report::from(error)
            .change_context(KernelError::Internal)
            .attach_printable(format!("Failed to read {SECRET_KEY}"))),
    }
}
