pub mod company;
pub mod health;
pub mod invoices;

pub use company::{get_company, update_company, upload_logo};
pub use health::{health_check, route_not_found};
pub use invoices::{
    create_invoice, download_invoice_pdf, export_invoice, get_invoice, list_invoices,
    print_invoice_pdf,
};
