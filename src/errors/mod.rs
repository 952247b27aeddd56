mod api;
mod frame;

pub use api::ApiError;
pub use frame::FrameError;
