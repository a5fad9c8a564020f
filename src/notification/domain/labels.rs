//! Fixed label table for task kinds and urgency levels.

use crate::task::domain::{TaskKind, Urgency};

/// Returns the icon shown for a task kind.
#[must_use]
pub const fn kind_icon(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Medical => "🏥",
        TaskKind::Transport => "🚗",
        TaskKind::Shopping => "🛒",
        TaskKind::General => "🤝",
    }
}

/// Returns the human-readable label for a task kind, icon included.
#[must_use]
pub const fn kind_label(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Medical => "🏥 Medical / first aid",
        TaskKind::Transport => "🚗 Transport / ride",
        TaskKind::Shopping => "🛒 Shopping / delivery",
        TaskKind::General => "🤝 General help",
    }
}

/// Returns the urgency indicator used in notification titles.
#[must_use]
pub const fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "🔴 Urgent!",
        Urgency::Medium => "🟠 Medium",
        Urgency::Low => "🟢 Normal",
    }
}
