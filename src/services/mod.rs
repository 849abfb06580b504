pub mod company_store;
pub mod database;
pub mod renderer;
pub mod sheets;
pub mod tax;

pub use company_store::CompanyStore;
pub use database::MongoDb;
pub use renderer::Disposition;
pub use sheets::{ExportSink, SheetsExporter};
pub use tax::{TaxEngine, TaxPolicy};
