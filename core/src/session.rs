use core::fmt;
use rand::{SeedableRng, rngs::SmallRng};

use crate::*;

/// Source of wall-clock time for the game timer.
pub trait Clock {
    fn now_millis(&self) -> Millis;
}

/// One-shot messages for the player. Fire and forget.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The requested board can't be played, the game was not started.
    Rejected(GameError),
    Lost,
    Won { elapsed: Millis },
    NewRecord {
        difficulty: Difficulty,
        elapsed: Millis,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "❌ {}", err),
            Self::Lost => f.write_str("💥 You lost!"),
            Self::Won { elapsed } => write!(f, "🎉 Victory! Time: {}", format_time(*elapsed)),
            Self::NewRecord {
                difficulty,
                elapsed,
            } => write!(f, "🎯 New {} record: {}!", difficulty, format_time(*elapsed)),
        }
    }
}

/// Long-lived game controller: owns the current board, the timer and the best times.
pub struct Session<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    rng: SmallRng,
    config: BoardConfig,
    board: Option<Board>,
    started_at: Option<Millis>,
    ended_at: Option<Millis>,
    records: Records,
    shown_record: Option<Millis>,
}

impl<S: RecordStore, N: Notifier, C: Clock> Session<S, N, C> {
    /// Loads the stored records and selects the easy tier. No game is running yet.
    pub fn new(store: S, notifier: N, clock: C, seed: u64) -> Self {
        let records = Records::load(&store);
        log::debug!("loaded records: {:?}", records);
        let mut session = Self {
            store,
            notifier,
            clock,
            rng: SmallRng::seed_from_u64(seed),
            config: BoardConfig::default(),
            board: None,
            started_at: None,
            ended_at: None,
            records,
            shown_record: None,
        };
        session.configure_difficulty(Difficulty::default());
        session
    }

    /// Fills the editable configuration with a tier's preset and shows that tier's record.
    ///
    /// `Custom` keeps whatever is currently entered.
    pub fn configure_difficulty(&mut self, difficulty: Difficulty) {
        if let Some(preset) = difficulty.preset() {
            self.config = preset;
        }
        self.shown_record = self.records.get(self.difficulty());
    }

    /// Overrides the editable configuration. Validation happens on start.
    pub fn set_config(&mut self, config: BoardConfig) {
        self.config = config;
    }

    /// Warns the player about an edit that can't be represented, the configuration is unchanged.
    pub fn reject_config(&mut self, err: GameError) {
        log::warn!("rejected edit of {:?}: {}", self.config, err);
        self.notifier.notify(Notice::Rejected(err));
    }

    pub fn start_game(&mut self) -> Result<()> {
        self.start_game_with(self.config)
    }

    /// Replaces the current board with a freshly mined one.
    ///
    /// On an unplayable configuration the player is warned and the previous board stays as it was.
    pub fn start_game_with(&mut self, config: BoardConfig) -> Result<()> {
        let mut board = match Board::new(config) {
            Ok(board) => board,
            Err(err) => {
                log::warn!("rejected board {:?}: {}", config, err);
                self.notifier.notify(Notice::Rejected(err));
                return Err(err);
            }
        };
        board.place_mines(&mut self.rng)?;

        self.config = config;
        self.board = Some(board);
        self.started_at = None;
        self.ended_at = None;
        self.shown_record = self.records.get(config.difficulty());
        log::debug!("started {} game {:?}", config.difficulty(), config);
        Ok(())
    }

    pub fn handle_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let Some(board) = self.board.as_mut() else {
            return Ok(RevealOutcome::NoChange);
        };
        if board.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }

        let now = self.clock.now_millis();
        let difficulty = board.config().difficulty();
        let outcome = board.reveal(coords)?;
        if outcome.has_update() && self.started_at.is_none() {
            log::debug!("timer started at {}", now);
            self.started_at = Some(now);
        }

        match outcome {
            RevealOutcome::NoChange | RevealOutcome::Continue => {}
            RevealOutcome::Lost => {
                self.ended_at = Some(now);
                self.notifier.notify(Notice::Lost);
            }
            RevealOutcome::Won => {
                let ended_at = self.clock.now_millis();
                self.ended_at = Some(ended_at);
                let elapsed = ended_at.saturating_sub(self.started_at.unwrap_or(now));
                self.notifier.notify(Notice::Won { elapsed });
                self.evaluate_record(difficulty, elapsed);
            }
        }
        Ok(outcome)
    }

    pub fn handle_flag_toggle(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        match self.board.as_mut() {
            Some(board) => board.toggle_flag(coords),
            None => Ok(FlagOutcome::NoChange),
        }
    }

    fn evaluate_record(&mut self, difficulty: Difficulty, elapsed: Millis) {
        match self.records.evaluate(&mut self.store, difficulty, elapsed) {
            RecordOutcome::Untracked => {}
            RecordOutcome::Kept(best) => self.shown_record = Some(best),
            RecordOutcome::NewRecord(best) => {
                self.shown_record = Some(best);
                self.notifier.notify(Notice::NewRecord {
                    difficulty,
                    elapsed: best,
                });
            }
        }
    }

    /// Time on the game clock: zero before the first reveal, frozen once the game ends.
    pub fn elapsed_millis(&self) -> Millis {
        match self.started_at {
            Some(started_at) => self
                .ended_at
                .unwrap_or_else(|| self.clock.now_millis())
                .saturating_sub(started_at),
            None => 0,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    /// Tier of the editable configuration, by exact tuple match.
    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn shown_record(&self) -> Option<Millis> {
        self.shown_record
    }

    pub fn started_at(&self) -> Option<Millis> {
        self.started_at
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{
        collections::BTreeMap,
        rc::Rc,
        string::{String, ToString},
        vec::Vec,
    };

    #[derive(Default)]
    struct MemoryStore(BTreeMap<String, String>);

    impl RecordStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    #[derive(Default)]
    struct Inbox(Vec<Notice>);

    impl Notifier for Inbox {
        fn notify(&mut self, notice: Notice) {
            self.0.push(notice);
        }
    }

    #[derive(Clone, Default)]
    struct FakeClock(Rc<core::cell::Cell<Millis>>);

    impl FakeClock {
        fn advance(&self, millis: Millis) {
            self.0.set(self.0.get() + millis);
        }
    }

    impl Clock for FakeClock {
        fn now_millis(&self) -> Millis {
            self.0.get()
        }
    }

    type TestSession = Session<MemoryStore, Inbox, FakeClock>;

    fn session_with(store: MemoryStore) -> (TestSession, FakeClock) {
        let clock = FakeClock::default();
        clock.advance(1_000_000);
        let session = Session::new(store, Inbox::default(), clock.clone(), 7);
        (session, clock)
    }

    fn safe_cells(session: &TestSession) -> Vec<Coord2> {
        session
            .board()
            .unwrap()
            .iter_cells()
            .filter(|(_, cell)| !cell.is_mine())
            .map(|(coords, _)| coords)
            .collect()
    }

    fn any_mine(session: &TestSession) -> Coord2 {
        session
            .board()
            .unwrap()
            .iter_cells()
            .find(|(_, cell)| cell.is_mine())
            .map(|(coords, _)| coords)
            .unwrap()
    }

    /// A safe cell with a mine next to it; revealing it opens only itself.
    fn numbered_cell(session: &TestSession) -> Coord2 {
        session
            .board()
            .unwrap()
            .iter_cells()
            .find(|(_, cell)| !cell.is_mine() && cell.adjacent_mines() > 0)
            .map(|(coords, _)| coords)
            .unwrap()
    }

    /// Opens one numbered cell, lets `millis` pass, then reveals every remaining safe cell.
    fn play_to_win(session: &mut TestSession, clock: &FakeClock, millis: Millis) {
        let first = numbered_cell(session);
        assert_eq!(session.handle_reveal(first), Ok(RevealOutcome::Continue));
        clock.advance(millis);
        for coords in safe_cells(session) {
            session.handle_reveal(coords).unwrap();
        }
        assert_eq!(session.board().unwrap().state(), BoardState::Won);
    }

    #[test]
    fn starts_on_easy_without_a_board() {
        let (mut session, _) = session_with(MemoryStore::default());

        assert_eq!(session.config(), BoardConfig::new(9, 9, 10));
        assert_eq!(session.difficulty(), Difficulty::Easy);
        assert!(session.board().is_none());
        assert_eq!(session.handle_reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(session.handle_flag_toggle((0, 0)), Ok(FlagOutcome::NoChange));
    }

    #[test]
    fn configure_difficulty_shows_stored_record() {
        let mut store = MemoryStore::default();
        store.set("record_medium", "83000");
        let (mut session, _) = session_with(store);

        assert_eq!(session.shown_record(), None);
        session.configure_difficulty(Difficulty::Medium);
        assert_eq!(session.config(), BoardConfig::new(16, 16, 40));
        assert_eq!(session.shown_record(), Some(83_000));
    }

    #[test]
    fn start_builds_a_mined_board() {
        let (mut session, _) = session_with(MemoryStore::default());
        session.configure_difficulty(Difficulty::Hard);
        session.start_game().unwrap();

        let board = session.board().unwrap();
        assert_eq!(board.size(), (30, 16));
        let mines = board.iter_cells().filter(|(_, cell)| cell.is_mine()).count();
        assert_eq!(mines, 99);
        assert_eq!(session.started_at(), None);
    }

    #[test]
    fn rejected_config_keeps_previous_board() {
        let (mut session, _) = session_with(MemoryStore::default());
        session.start_game().unwrap();
        let before = session.board().cloned();

        let err = session.start_game_with(BoardConfig::new(3, 3, 9));

        assert_eq!(err, Err(GameError::TooManyMines));
        assert_eq!(session.board().cloned(), before);
        assert_eq!(session.config(), BoardConfig::new(9, 9, 10));
        assert_eq!(
            session.notifier().0,
            [Notice::Rejected(GameError::TooManyMines)]
        );
    }

    #[test]
    fn unrepresentable_edit_warns_and_keeps_config() {
        let (mut session, _) = session_with(MemoryStore::default());
        session.configure_difficulty(Difficulty::Medium);

        session.reject_config(GameError::BoardTooLarge);

        assert_eq!(session.config(), BoardConfig::new(16, 16, 40));
        assert_eq!(
            session.notifier().0,
            [Notice::Rejected(GameError::BoardTooLarge)]
        );
        session.start_game().unwrap();
        assert_eq!(session.board().unwrap().size(), (16, 16));
    }

    #[test]
    fn timer_starts_on_first_accepted_reveal() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.start_game().unwrap();
        let safe = numbered_cell(&session);

        session.handle_flag_toggle(safe).unwrap();
        assert_eq!(session.handle_reveal(safe), Ok(RevealOutcome::NoChange));
        assert_eq!(session.started_at(), None);
        assert_eq!(session.elapsed_millis(), 0);

        session.handle_flag_toggle(safe).unwrap();
        clock.advance(500);
        assert_eq!(session.handle_reveal(safe), Ok(RevealOutcome::Continue));
        assert_eq!(session.started_at(), Some(1_000_500));

        clock.advance(2_000);
        assert_eq!(session.elapsed_millis(), 2_000);
    }

    #[test]
    fn losing_notifies_and_freezes_the_board() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.start_game().unwrap();
        let mine = any_mine(&session);

        assert_eq!(session.handle_reveal(mine), Ok(RevealOutcome::Lost));
        assert_eq!(session.notifier().0, [Notice::Lost]);
        assert!(
            session
                .board()
                .unwrap()
                .iter_cells()
                .all(|(_, cell)| cell.is_revealed())
        );

        clock.advance(10_000);
        assert_eq!(session.elapsed_millis(), 0);
        let safe = safe_cells(&session)[0];
        assert_eq!(session.handle_reveal(safe), Ok(RevealOutcome::NoChange));
        assert_eq!(session.handle_flag_toggle(safe), Ok(FlagOutcome::NoChange));
        assert_eq!(session.notifier().0.len(), 1);
    }

    #[test]
    fn first_tier_win_sets_record() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.start_game().unwrap();

        play_to_win(&mut session, &clock, 65_000);

        let elapsed = session.elapsed_millis();
        assert_eq!(elapsed, 65_000);
        assert_eq!(
            session.notifier().0,
            [
                Notice::Won { elapsed },
                Notice::NewRecord {
                    difficulty: Difficulty::Easy,
                    elapsed,
                },
            ]
        );
        assert_eq!(session.shown_record(), Some(elapsed));
        assert_eq!(session.records().get(Difficulty::Easy), Some(elapsed));
        assert_eq!(
            session.store().get("record_easy"),
            Some(elapsed.to_string())
        );
    }

    #[test]
    fn slower_win_keeps_record() {
        let mut store = MemoryStore::default();
        store.set("record_easy", "1000");
        let (mut session, clock) = session_with(store);
        session.start_game().unwrap();

        play_to_win(&mut session, &clock, 5_000);

        let elapsed = session.elapsed_millis();
        assert_eq!(session.notifier().0, [Notice::Won { elapsed }]);
        assert_eq!(session.shown_record(), Some(1_000));
        assert_eq!(session.store().get("record_easy").as_deref(), Some("1000"));
    }

    #[test]
    fn hand_entered_preset_counts_as_tier() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.configure_difficulty(Difficulty::Easy);
        session.set_config(BoardConfig::new(30, 16, 99));
        assert_eq!(session.difficulty(), Difficulty::Hard);
        session.start_game().unwrap();

        play_to_win(&mut session, &clock, 1_000);

        assert!(session.store().get("record_hard").is_some());
    }

    #[test]
    fn custom_win_is_not_recorded() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.set_config(BoardConfig::new(5, 5, 3));
        session.start_game().unwrap();
        assert_eq!(session.shown_record(), None);

        play_to_win(&mut session, &clock, 1_000);

        let elapsed = session.elapsed_millis();
        assert_eq!(session.notifier().0, [Notice::Won { elapsed }]);
        assert!(session.store().0.is_empty());
        assert_eq!(session.shown_record(), None);
    }

    #[test]
    fn new_game_resets_timer() {
        let (mut session, clock) = session_with(MemoryStore::default());
        session.start_game().unwrap();
        let mine = any_mine(&session);
        session.handle_reveal(mine).unwrap();
        assert!(session.started_at().is_some());

        clock.advance(1_000);
        session.start_game().unwrap();

        assert_eq!(session.started_at(), None);
        assert_eq!(session.elapsed_millis(), 0);
        assert_eq!(session.board().unwrap().state(), BoardState::InProgress);
    }

    #[test]
    fn out_of_bounds_reveal_is_an_error_not_a_panic() {
        let (mut session, _) = session_with(MemoryStore::default());
        session.start_game().unwrap();

        assert_eq!(session.handle_reveal((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(
            session.handle_flag_toggle((0, 200)),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(session.started_at(), None);
    }

    #[test]
    fn notices_read_like_messages() {
        use alloc::format;

        assert_eq!(
            format!("{}", Notice::Won { elapsed: 65_000 }),
            "🎉 Victory! Time: 1:05"
        );
        assert_eq!(
            format!("{}", Notice::Rejected(GameError::TooManyMines)),
            "❌ Too many mines, there must be fewer mines than cells"
        );
    }
}
