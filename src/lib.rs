#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logger;
pub mod minimizers;
pub mod mode;
pub mod models;
pub mod plugins;
pub mod project;
pub mod resolver;
pub mod rules;
pub mod templates;

pub use config::{ProjectConfig, load_layout};
pub use error::{ConfigError, InvalidModeError, TemplateError};
pub use mode::{BuildMode, ModeProfile};
pub use models::BuildConfiguration;
pub use project::ProjectLayout;
pub use resolver::{ConfigResolver, resolve};
