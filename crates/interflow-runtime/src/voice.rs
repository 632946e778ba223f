//! Voice-state transitions.
//!
//! The platform reports voice activity as a pair of states, before and after
//! a change. [`classify`] turns the pair into what actually happened.

use serde::{Deserialize, Serialize};

/// A member's voice state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoiceState {
    pub user_id: String,
    /// The connected channel, if any.
    pub channel_id: Option<String>,
    pub mute: bool,
    pub deaf: bool,
}

impl VoiceState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn deafened(mut self, deaf: bool) -> Self {
        self.deaf = deaf;
        self
    }
}

/// A classified voice transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The member connected to `state.channel_id`.
    Join {
        state: VoiceState,
        /// The state in the channel the member moved from.
        previous: Option<VoiceState>,
    },
    /// The member left `state.channel_id`.
    Quit {
        state: VoiceState,
        /// The disconnected state, when the member left voice entirely.
        next: Option<VoiceState>,
    },
    /// The member toggled mute or deafen without moving.
    MuteOrDeaf {
        before: VoiceState,
        after: VoiceState,
    },
}

impl VoiceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Quit { .. } => "quit",
            Self::MuteOrDeaf { .. } => "mute_or_deaf",
        }
    }
}

/// Classifies the change from `before` to `after`.
///
/// A move between channels yields a quit followed by a join.
pub fn classify(before: &VoiceState, after: &VoiceState) -> Vec<VoiceEvent> {
    match (&before.channel_id, &after.channel_id) {
        (None, None) => Vec::new(),
        (None, Some(_)) => vec![VoiceEvent::Join {
            state: after.clone(),
            previous: None,
        }],
        (Some(_), None) => vec![VoiceEvent::Quit {
            state: before.clone(),
            next: Some(after.clone()),
        }],
        (Some(from), Some(to)) if from != to => vec![
            VoiceEvent::Quit {
                state: before.clone(),
                next: None,
            },
            VoiceEvent::Join {
                state: after.clone(),
                previous: Some(before.clone()),
            },
        ],
        _ if before.mute != after.mute || before.deaf != after.deaf => {
            vec![VoiceEvent::MuteOrDeaf {
                before: before.clone(),
                after: after.clone(),
            }]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> VoiceState {
        VoiceState::new("42")
    }

    #[test]
    fn test_join_and_quit() {
        let away = user();
        let lounge = user().in_channel("lounge");

        assert_eq!(
            classify(&away, &lounge),
            vec![VoiceEvent::Join {
                state: lounge.clone(),
                previous: None,
            }]
        );
        assert_eq!(
            classify(&lounge, &away),
            vec![VoiceEvent::Quit {
                state: lounge,
                next: Some(away),
            }]
        );
    }

    #[test]
    fn test_move_is_quit_then_join() {
        let lounge = user().in_channel("lounge");
        let stage = user().in_channel("stage");

        let events = classify(&lounge, &stage);
        let names: Vec<_> = events.iter().map(VoiceEvent::name).collect();
        assert_eq!(names, ["quit", "join"]);
        assert_eq!(
            events[1],
            VoiceEvent::Join {
                state: stage,
                previous: Some(lounge),
            }
        );
    }

    #[test]
    fn test_mute_and_deaf() {
        let lounge = user().in_channel("lounge");

        let events = classify(&lounge, &lounge.clone().muted(true));
        assert!(matches!(&events[..], [VoiceEvent::MuteOrDeaf { after, .. }] if after.mute));

        let events = classify(&lounge, &lounge.clone().deafened(true));
        assert_eq!(events.len(), 1);

        assert!(classify(&lounge, &lounge).is_empty());
        assert!(classify(&user(), &user().muted(true)).is_empty());
    }
}
