pub mod page;
pub mod policy;
pub mod registry;
pub mod settings;

pub use page::{Page, RenderMode};
pub use policy::PipelinePolicy;
pub use registry::PageRegistry;
