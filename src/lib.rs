//! A terminal reader that keeps a ruler over the line of text under the
//! mouse pointer, including text inside embedded frames.

pub mod app;
pub mod component_context;
pub mod components;
pub mod config;
pub mod constants;
pub mod context;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod frames;
pub mod geometry;
pub mod host;
pub mod keybindings;
pub mod locator;
pub mod messages;
pub mod page;
pub mod preferences;
pub mod ruler;
pub mod scheduler;
pub mod state;
pub mod surface;
pub mod term_color;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod visualizer;
