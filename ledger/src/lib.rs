pub mod block;
pub mod cube;
pub mod element;
mod engine;
mod errors;
pub mod face;
pub mod record;

pub use block::{Block, BlockRef};
pub use cube::Cube;
pub use element::FaceElement;
pub use engine::Ledger;
pub use errors::{LedgerRejection, LedgerResult};
pub use face::Face;
pub use record::CubeRecord;
