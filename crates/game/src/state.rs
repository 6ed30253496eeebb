use tokio::time::Instant;

/// Identifies one pass through `Ready`. A timer only applies to the round it was scheduled for.
pub type Round = u64;

/// The single game session's state.
///
/// ```text
/// Waiting --click--> Ready --timer--> Green --click--> Finished
///                      |                                  |
///                      +--click--> FalseStart             |
/// Finished | FalseStart --click--> Waiting <--------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Waiting,
    Ready { round: Round, armed_at: Instant },
    Green { round: Round, shown_at: Instant },
    Finished { reaction_time_ms: u32 },
    FalseStart { waited_ms: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Click,
    GreenTimerFired { round: Round },
}

/// A side effect the owner of the state machine must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Arm the one-shot timer that turns the signal green for `round`.
    ScheduleGreen { round: Round },
    /// Release the pending timer; the machine has left `Ready`.
    CancelGreen,
}

/// The state machine. Pure: it never sleeps or spawns, it only returns commands.
#[derive(Debug)]
pub struct Game {
    state: GameState,
    rounds: Round,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            state: GameState::Waiting,
            rounds: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Applies `event` at `now`. Events that do not apply to the current
    /// state, including timer fires for an earlier round, change nothing.
    pub fn handle(&mut self, event: GameEvent, now: Instant) -> Option<Command> {
        let (next, command) = match (self.state, event) {
            (GameState::Waiting, GameEvent::Click) => {
                self.rounds += 1;
                let round = self.rounds;
                (
                    GameState::Ready {
                        round,
                        armed_at: now,
                    },
                    Some(Command::ScheduleGreen { round }),
                )
            }
            (GameState::Ready { armed_at, .. }, GameEvent::Click) => (
                GameState::FalseStart {
                    waited_ms: elapsed_ms(armed_at, now),
                },
                Some(Command::CancelGreen),
            ),
            (GameState::Ready { round, .. }, GameEvent::GreenTimerFired { round: fired })
                if fired == round =>
            {
                (
                    GameState::Green {
                        round,
                        shown_at: now,
                    },
                    None,
                )
            }
            (GameState::Green { shown_at, .. }, GameEvent::Click) => (
                GameState::Finished {
                    reaction_time_ms: elapsed_ms(shown_at, now),
                },
                None,
            ),
            (GameState::Finished { .. } | GameState::FalseStart { .. }, GameEvent::Click) => {
                (GameState::Waiting, None)
            }
            (state, GameEvent::GreenTimerFired { round }) => {
                tracing::debug!(round, ?state, "Ignoring stale green timer.");
                (state, None)
            }
        };
        self.state = next;
        command
    }

    /// Returns to `Waiting` from any state, cancelling a pending timer if one is armed.
    pub fn reset(&mut self) -> Option<Command> {
        let command = match self.state {
            GameState::Ready { .. } => Some(Command::CancelGreen),
            _ => None,
        };
        self.state = GameState::Waiting;
        command
    }
}

/// Whole milliseconds between two instants, never less than 1 so the result
/// is always a valid reaction time.
fn elapsed_ms(from: Instant, to: Instant) -> u32 {
    let ms = to.saturating_duration_since(from).as_millis();
    u32::try_from(ms).unwrap_or(u32::MAX).max(1)
}
