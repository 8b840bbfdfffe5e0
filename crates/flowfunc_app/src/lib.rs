// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless host for the flowfunc node editor.
//!
//! Provides the editor component that ties host props to the compiled
//! registry, a graph engine and its rendered surface, plus an in-memory
//! engine and a replay driver used by the `flowfunc` binary.

pub mod editor;
pub mod error;
pub mod headless;
pub mod props;
pub mod replay;

pub use editor::Editor;
pub use error::AppError;
pub use headless::HeadlessEngine;
pub use props::{EditorOutput, EditorProps, EditorStatus};
pub use replay::{Script, Step};
