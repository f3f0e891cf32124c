//! Market data collaborators: the price provider and portfolio store seams,
//! and the assembler that turns stored holdings into a priced snapshot.

mod market_data_model;
mod market_data_traits;
mod snapshot_assembler;

pub use market_data_model::PricePoint;
pub use market_data_traits::{MarketDataProvider, PortfolioStore};
pub use snapshot_assembler::SnapshotAssembler;
