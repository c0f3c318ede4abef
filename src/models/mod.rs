pub mod error;
pub mod history;
pub mod rank;
pub mod season;
pub mod session;

pub use error::*;
pub use history::*;
pub use rank::*;
pub use season::*;
pub use session::*;
