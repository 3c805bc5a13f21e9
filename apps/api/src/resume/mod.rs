pub mod extract;
pub mod model;
pub mod normalize;
pub mod template;

pub use extract::extract;
pub use model::Resume;
pub use normalize::normalize;
pub use template::{render, render_envelope, RenderError};
