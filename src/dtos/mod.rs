pub mod company;
pub mod invoices;

pub use company::CompanyUpdate;
pub use invoices::{
    ApiResponse, CreateInvoiceRequest, InvoiceResponse, LineItemRequest, ListInvoicesParams,
};
