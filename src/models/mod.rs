pub mod company;
pub mod invoice;

pub use company::CompanyProfile;
pub use invoice::{Invoice, LineItem};
