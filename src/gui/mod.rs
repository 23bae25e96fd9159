//! GUIモジュール

mod app;
mod session;
mod theme;

pub use app::{preview_thumbnail, run, LogReaderApp, PREVIEW_MAX};
pub use session::{LogSession, Notice, NoticeLevel};
