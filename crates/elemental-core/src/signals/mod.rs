//! Signals - element ごとの名前付きイベント

pub mod board;

pub use self::board::{SignalBoard, SignalOutcome};
