pub mod document;
pub mod layout;
pub mod page_master;

pub use document::{Block, BlockType, Document, Flow, FlowType, Metadata, Section};
pub use layout::{ChunkBlock, ColumnBox, LayoutBlock, LayoutResult, PageBox, Placement};
pub use page_master::{Margins, Orientation, PageMaster, PageSize};
