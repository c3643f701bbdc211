pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod controls;
pub mod core;
pub mod debug_panel;
pub mod error;
pub mod loaders;
pub mod material;
pub mod page;
pub mod render;
pub mod scene;
pub mod timeline;

pub use config::{SceneConfig, Variant};
pub use controller::{ModelStatus, SceneController};
pub use error::{AssetError, SceneError, SceneResult};
pub use page::{PageLayout, PageScroll};
pub use timeline::ScrollTimeline;
