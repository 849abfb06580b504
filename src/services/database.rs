use crate::error::AppError;
use crate::models::Invoice;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::doc, options::FindOptions, options::IndexOptions, Client as MongoClient, Collection,
    Database, IndexModel,
};

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for invoice-service");

        // Compound index on (owner_email, created_at) for the
        // newest-first list-by-owner query.
        let owner_index = IndexModel::builder()
            .keys(doc! { "owner_email": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("owner_created_lookup".to_string())
                    .build(),
            )
            .build();

        self.invoices()
            .create_index(owner_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create owner_email index on invoices collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on invoices.(owner_email, created_at)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub async fn create_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.invoices()
            .insert_one(invoice, None)
            .await
            .map_err(|e| {
                tracing::error!(invoice_id = %invoice.id, "Failed to insert invoice: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    /// All invoices for one owner, newest-created first. An owner with no
    /// invoices yields an empty list, not an error.
    pub async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Invoice>, AppError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .invoices()
            .find(doc! { "owner_email": owner_email }, find_options)
            .await
            .map_err(AppError::from)?;

        let mut invoices = Vec::new();
        while let Some(invoice) = cursor.try_next().await.map_err(AppError::from)? {
            invoices.push(invoice);
        }
        Ok(invoices)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        self.invoices()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)
    }
}
