use crate::KernelError;

#[async_trait::async_trait]
pub trait DatabaseConnection: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError>;

    /// Opens a transaction that owns the write lock before its first read,
    /// so a read-then-write sequence cannot be invalidated by another writer.
    async fn transact_write(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        self.transact().await
    }
}

pub trait DependOnDatabaseConnection: 'static + Sync + Send {
    type DatabaseConnection: DatabaseConnection;
    fn database_connection(&self) -> &Self::DatabaseConnection;
}

impl<T> DependOnDatabaseConnection for T
where
    T: DatabaseConnection,
{
    type DatabaseConnection = T;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self
    }
}

#[async_trait::async_trait]
pub trait Transaction: 'static + Sync + Send {
    async fn commit(self) -> error_stack::Result<(), KernelError>;
    /// Discards the transaction. Reads end here rather than by drop.
    async fn roll_back(self) -> error_stack::Result<(), KernelError>;
}
