pub mod allocator;
pub mod catalog;
pub mod layout;
pub mod pricing;

pub use allocator::{SeatAllocator, SeatStatus, Selection};
pub use catalog::{Catalog, CatalogError};
pub use layout::{SeatCell, SeatLayout, SeatMapRow};
pub use pricing::{PlatformPrices, PriceQuote, PricingEntry};
