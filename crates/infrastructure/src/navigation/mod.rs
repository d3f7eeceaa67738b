//! Client-side navigation.

mod history;

pub use history::HistoryNavigator;
