pub mod canonical;
pub mod classifier;
pub mod grid_manager;
pub mod pixel;
pub mod pixel_buffer;
pub mod sampler;
pub mod smart_pixel;
pub mod white_balance;
pub mod white_detector;
