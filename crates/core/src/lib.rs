//! Core primitives shared by the video chip crates.

pub mod logging;
pub mod renderer;
pub mod video;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// ARGB8888 picture handed to frontends.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }
}
