use crate::error::GameError;
use crate::render;
use crate::state::{Command, Game, GameEvent, GameState};
use crate::timer::{random_delay, GreenTimer};
use api_client::error::ApiError;
use api_client::LeaderboardApi;
use configuration::GameConfig;
use core_types::{
    validate_participant_name, Attempt, LeaderboardEntry, SubmitAttemptRequest, TimeFilter,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

/// Everything that reaches the session besides keyboard input.
#[derive(Debug)]
pub enum SessionEvent {
    Game(GameEvent),
    /// `load` numbers the request; only the newest one is displayed.
    LeaderboardLoaded {
        load: u64,
        filter: TimeFilter,
        result: Result<Vec<LeaderboardEntry>, ApiError>,
    },
    PersonalBestLoaded {
        name: String,
        result: Result<Option<Attempt>, ApiError>,
    },
    Submitted {
        false_start: bool,
        result: Result<Attempt, ApiError>,
    },
}

/// One line of keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Click,
    Submit,
    Name(String),
    Filter(TimeFilter),
    Reload,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Input {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };
        match (cmd, arg) {
            ("", _) => Input::Click,
            ("s", "") => Input::Submit,
            ("n", name) if !name.is_empty() => Input::Name(name.to_string()),
            ("f", filter) => match filter.parse() {
                Ok(filter) => Input::Filter(filter),
                Err(_) => Input::Unknown(line.to_string()),
            },
            ("l", "") => Input::Reload,
            ("h" | "?", "") => Input::Help,
            ("q", "") => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The single interactive game session. Owns the state machine, its timer,
/// and the last successfully loaded leaderboard and personal best.
///
/// Network calls run in the background and report back as `SessionEvent`s;
/// they never gate the timer-driven transitions. A failed call is logged and
/// leaves whatever was displayed before in place.
pub struct Session<W: Write> {
    api: Arc<dyn LeaderboardApi>,
    settings: GameConfig,
    out: W,

    game: Game,
    timer: Option<GreenTimer>,

    participant: Option<String>,
    filter: TimeFilter,
    leaderboard: Vec<LeaderboardEntry>,
    personal_best: Option<Attempt>,
    loading_leaderboard: bool,
    leaderboard_loads: u64,
    submitting: bool,

    events_tx: UnboundedSender<SessionEvent>,
    events_rx: Option<UnboundedReceiver<SessionEvent>>,
}

impl<W: Write> Session<W> {
    pub fn new(
        api: Arc<dyn LeaderboardApi>,
        settings: GameConfig,
        participant: Option<String>,
        out: W,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            settings,
            out,
            game: Game::new(),
            timer: None,
            participant: participant.filter(|name| validate_participant_name(name).is_ok()),
            filter: TimeFilter::AllTime,
            leaderboard: Vec::new(),
            personal_best: None,
            loading_leaderboard: false,
            leaderboard_loads: 0,
            submitting: false,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    pub fn state(&self) -> GameState {
        self.game.state()
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn personal_best(&self) -> Option<&Attempt> {
        self.personal_best.as_ref()
    }

    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_loading_leaderboard(&self) -> bool {
        self.loading_leaderboard
    }

    /// Runs until `q` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> Result<(), GameError> {
        let Some(mut events) = self.events_rx.take() else {
            return Ok(());
        };
        let mut lines = input.lines();

        writeln!(self.out, "Reaction Time Test\n{}", render::HELP)?;
        self.refresh()?;
        self.show_status()?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.handle_input(&line)? == Flow::Quit {
                        break;
                    }
                }
                Some(event) = events.recv() => self.handle_event(event)?,
            }
        }

        self.cancel_timer();
        writeln!(self.out, "Bye!")?;
        Ok(())
    }

    pub fn handle_input(&mut self, line: &str) -> Result<Flow, GameError> {
        match Input::parse(line) {
            Input::Click => {
                if self.submitting {
                    return Ok(Flow::Continue);
                }
                self.apply(GameEvent::Click)?;
            }
            Input::Submit => self.submit_finished()?,
            Input::Name(name) => self.set_name(name)?,
            Input::Filter(filter) => {
                self.filter = filter;
                self.load_leaderboard()?;
            }
            Input::Reload => self.load_leaderboard()?,
            Input::Help => writeln!(self.out, "{}", render::HELP)?,
            Input::Quit => return Ok(Flow::Quit),
            Input::Unknown(text) => {
                writeln!(self.out, "Unknown command '{text}'. Type 'h' for help.")?
            }
        }
        Ok(Flow::Continue)
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Result<(), GameError> {
        match event {
            SessionEvent::Game(event) => self.apply(event)?,
            SessionEvent::LeaderboardLoaded {
                load,
                filter,
                result,
            } => {
                if load != self.leaderboard_loads {
                    tracing::debug!(load, %filter, "Dropping a superseded leaderboard response.");
                    return Ok(());
                }
                self.loading_leaderboard = false;
                match result {
                    Ok(entries) => {
                        self.leaderboard = entries;
                        writeln!(
                            self.out,
                            "{}",
                            render::leaderboard_table(self.filter, &self.leaderboard)
                        )?;
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to load leaderboard."),
                }
            }
            SessionEvent::PersonalBestLoaded { name, result } => {
                if self.participant.as_deref() != Some(name.as_str()) {
                    return Ok(());
                }
                match result {
                    Ok(best) => {
                        self.personal_best = best;
                        writeln!(
                            self.out,
                            "{}",
                            render::personal_best_line(&name, self.personal_best.as_ref())
                        )?;
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to load personal best."),
                }
            }
            SessionEvent::Submitted { false_start, result } => match result {
                Ok(attempt) if false_start => {
                    tracing::info!(id = attempt.id, "False start recorded.");
                }
                Ok(attempt) => {
                    self.submitting = false;
                    tracing::info!(id = attempt.id, "Score submitted.");
                    writeln!(self.out, "Submitted {}ms.", attempt.reaction_time_ms)?;
                    self.refresh()?;
                    self.reset_game()?;
                }
                Err(e) if false_start => {
                    tracing::warn!(error = %e, "Failed to record false start.");
                }
                Err(e) => {
                    self.submitting = false;
                    tracing::warn!(error = %e, "Failed to submit score.");
                    writeln!(self.out, "Submission failed: {e}")?;
                }
            },
        }
        Ok(())
    }

    fn apply(&mut self, event: GameEvent) -> Result<(), GameError> {
        let before = self.game.state();
        let command = self.game.handle(event, Instant::now());
        self.execute(command);

        let after = self.game.state();
        if after != before {
            if let GameState::FalseStart { waited_ms } = after {
                self.record_false_start(waited_ms);
            }
            self.show_status()?;
        }
        Ok(())
    }

    fn execute(&mut self, command: Option<Command>) {
        match command {
            Some(Command::ScheduleGreen { round }) => {
                let delay = random_delay(self.settings.min_delay_ms, self.settings.max_delay_ms);
                tracing::debug!(round, delay_ms = delay.as_millis() as u64, "Arming green timer.");
                self.timer = Some(GreenTimer::schedule(
                    delay,
                    self.events_tx.clone(),
                    SessionEvent::Game(GameEvent::GreenTimerFired { round }),
                ));
            }
            Some(Command::CancelGreen) => self.cancel_timer(),
            None => {}
        }
        // The timer is only ever held while the game is `Ready`.
        if !matches!(self.game.state(), GameState::Ready { .. }) {
            self.timer = None;
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn reset_game(&mut self) -> Result<(), GameError> {
        let command = self.game.reset();
        self.execute(command);
        self.show_status()
    }

    fn show_status(&mut self) -> Result<(), GameError> {
        writeln!(self.out, "{}", render::status_line(&self.game.state()))?;
        Ok(())
    }

    fn set_name(&mut self, name: String) -> Result<(), GameError> {
        if let Err(e) = validate_participant_name(&name) {
            writeln!(self.out, "Invalid name: {e}")?;
            return Ok(());
        }
        writeln!(self.out, "Playing as {name}.")?;
        self.participant = Some(name);
        self.personal_best = None;
        self.load_personal_best();
        Ok(())
    }

    fn submit_finished(&mut self) -> Result<(), GameError> {
        let GameState::Finished { reaction_time_ms } = self.game.state() else {
            writeln!(self.out, "Finish a round before submitting.")?;
            return Ok(());
        };
        let Some(name) = self.participant.clone() else {
            writeln!(self.out, "Set your name first with 'n <name>'.")?;
            return Ok(());
        };
        if self.submitting {
            return Ok(());
        }
        self.submitting = true;
        writeln!(self.out, "Submitting...")?;
        self.spawn_submit(name, reaction_time_ms, false);
        Ok(())
    }

    fn record_false_start(&mut self, waited_ms: u32) {
        if !self.settings.record_false_starts {
            return;
        }
        if let Some(name) = self.participant.clone() {
            self.spawn_submit(name, waited_ms.max(1), true);
        }
    }

    fn spawn_submit(&self, participant_name: String, reaction_time_ms: u32, false_start: bool) {
        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let request = SubmitAttemptRequest {
            participant_name,
            reaction_time_ms: f64::from(reaction_time_ms),
            is_false_start: false_start,
        };
        tokio::spawn(async move {
            let result = api.submit_reaction_time(&request).await;
            let _ = tx.send(SessionEvent::Submitted { false_start, result });
        });
    }

    /// Reloads both the leaderboard and the personal best.
    fn refresh(&mut self) -> Result<(), GameError> {
        self.load_leaderboard()?;
        self.load_personal_best();
        Ok(())
    }

    fn load_leaderboard(&mut self) -> Result<(), GameError> {
        self.loading_leaderboard = true;
        self.leaderboard_loads += 1;
        writeln!(self.out, "Loading leaderboard ({})...", self.filter.label())?;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let load = self.leaderboard_loads;
        let filter = self.filter;
        tokio::spawn(async move {
            let result = api.get_leaderboard(filter, None).await;
            let _ = tx.send(SessionEvent::LeaderboardLoaded {
                load,
                filter,
                result,
            });
        });
        Ok(())
    }

    fn load_personal_best(&self) {
        let Some(name) = self.participant.clone() else {
            return;
        };
        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.get_personal_best(&name).await;
            let _ = tx.send(SessionEvent::PersonalBestLoaded { name, result });
        });
    }

    #[cfg(test)]
    async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.as_mut()?.recv().await
    }
}
