pub mod clinical;
pub mod error;
pub mod record;
pub mod tooth;

pub use clinical::*;
pub use error::ChartError;
pub use record::*;
pub use tooth::*;
