//! Chat turn orchestration around the tagged stream decoder.

pub mod chart_hint;
pub mod display;
pub mod events;
pub mod history;
pub mod session;
pub mod stop;

pub use chart_hint::{
    looks_like_chart_request, previous_user_text, show_chart, show_chart_placeholder,
};
pub use display::DisplayEvent;
pub use events::{HistoryEvent, HistoryNotifier};
pub use history::{load_history, HistoryMessage};
pub use session::{ChatError, ChatSession, TurnRequest, TurnResult};
pub use stop::{stop_channel, StopHandle, StopSignal};
