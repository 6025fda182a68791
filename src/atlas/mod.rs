pub mod allocator;
pub mod auto_pack;
pub mod guide;
pub mod uv_mapper;

pub use allocator::{allocate, find_space, try_find_space};
pub use auto_pack::{auto_pack, PackSummary};
pub use guide::{render_guide, write_guide, GuideStyle};
pub use uv_mapper::{compute_uv, recompute_uv};
