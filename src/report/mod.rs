pub mod pipeline;
pub mod renderer;

pub use pipeline::ReportPipeline;
pub use renderer::ReportRenderer;
