use error_stack::Report;
use kernel::KernelError;

pub mod database;
mod error;

pub(crate) fn env_or_else(
    key: &str,
    default: impl FnOnce() -> String,
) -> error_stack::Result<String, KernelError> {
    match dotenvy::var(key) {
        Ok(value) => Ok(value),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default()),
        Err(error) => Err(Report::from(error)
            .change_context(KernelError::Internal)
            .attach_printable(format!("Failed to read environment variable {key}"))),
    }
}
