pub mod columns;
pub mod details;
pub mod error;
pub mod parsed;
pub mod price;
pub mod reader;
pub mod resolve;

pub use details::{parse_details, parse_details_file};
pub use error::{FeedError, FeedKind};
pub use parsed::ParsedFeed;
pub use price::{parse_price, parse_price_file, PriceParseOptions};
pub use reader::{find_column_index, read_rows, read_rows_from_path};
pub use resolve::resolve_feed_path;
