use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Menu -> Countdown
/// - Countdown -> Playing
/// - Playing <-> Paused
/// - Playing -> Completed
/// - Playing, Paused, Completed -> Countdown (restart)
/// - Playing, Paused, Completed -> Menu (exit)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Menu,
    Countdown,
    Playing,
    Paused,
    Completed,
}

impl GameStatus {
    /// A round is on the board and can be restarted or exited.
    pub const fn is_in_round(self) -> bool {
        matches!(self, Self::Playing | Self::Paused | Self::Completed)
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Menu
    }
}

/// Snapshot handed to the renderer after every transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub cards: Vec<Card>,
    pub first_selected: Option<CardId>,
    pub second_selected: Option<CardId>,
    pub score: u32,
    pub elapsed_ms: u64,
    pub status: GameStatus,
    pub countdown_value: u8,
    /// Consecutive matches since the last mismatch or round start.
    pub streak: u32,
}

impl GameState {
    fn initial(difficulty: Difficulty, countdown_from: u8) -> Self {
        Self {
            difficulty,
            cards: Vec::new(),
            first_selected: None,
            second_selected: None,
            score: 0,
            elapsed_ms: 0,
            status: GameStatus::Menu,
            countdown_value: countdown_from,
            streak: 0,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    /// Both cards of a turn are face up and waiting to be compared.
    pub fn has_pending_pair(&self) -> bool {
        self.first_selected.is_some() && self.second_selected.is_some()
    }

    pub fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|card| card.is_matched)
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched).count() / 2
    }

    pub fn elapsed_secs(&self) -> u32 {
        u32::try_from(self.elapsed_ms / 1000).unwrap_or(u32::MAX)
    }
}

/// Requests raised by the renderer, plus timer fires coming back from the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Start,
    Pause,
    Resume,
    Restart,
    Exit,
    SelectCard(CardId),
    ChangeDifficulty(Difficulty),
    SubmitName(String),
    TimerFired(TimerId),
}

/// Feedback cues, realizing them is up to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Match,
    Mismatch,
    Flip,
    Win,
}

/// Side effects queued by [`Game::dispatch`], drained with [`Game::take_effects`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Timer(TimerRequest),
    Feedback(Sound),
    /// The finished round qualifies for the leaderboard, ask the player for a name.
    PromptName { score: u32, difficulty: Difficulty },
    ScoreSaved { name: String, score: u32 },
    /// Recording the score failed, the game itself is unaffected.
    SaveFailed(StoreError),
}

/// Outcome of dispatching an event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Update {
    NoChange,
    Changed,
}

impl Update {
    /// Whether the snapshot could have changed
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingScore {
    score: u32,
    time_secs: u32,
    difficulty: Difficulty,
}

/// Owns the authoritative [`GameState`] and every transition rule. All mutation goes through [`Game::dispatch`].
#[derive(Debug)]
pub struct Game<S> {
    config: GameConfig,
    catalog: SymbolCatalog,
    state: GameState,
    timers: Timers,
    seeds: SmallRng,
    high_scores: HighScoreStore<S>,
    pending_score: Option<PendingScore>,
    /// Round clock when the second card of the pending pair was revealed.
    revealed_at_ms: u64,
    effects: Vec<Effect>,
}

impl<S: KeyValueStore> Game<S> {
    /// Sets up a game on the emoji catalog, failing only on a broken catalog.
    pub fn new(config: GameConfig, storage: S, seed: u64) -> Result<Self> {
        Ok(Self::with_catalog(
            config,
            SymbolCatalog::emoji()?,
            storage,
            seed,
        ))
    }

    pub fn with_catalog(config: GameConfig, catalog: SymbolCatalog, storage: S, seed: u64) -> Self {
        let config = config.sanitized();
        let high_scores =
            HighScoreStore::with_limits(storage, config.high_score_retention, config.leaderboard_size);
        let mut game = Self {
            config,
            catalog,
            state: GameState::initial(Difficulty::default(), config.countdown_from),
            timers: Timers::default(),
            seeds: SmallRng::seed_from_u64(seed),
            high_scores,
            pending_score: None,
            revealed_at_ms: 0,
            effects: Vec::new(),
        };
        game.state.cards = game.deal();
        game
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn high_scores(&self) -> &HighScoreStore<S> {
        &self.high_scores
    }

    /// Score waiting for a player name, if the finished round qualified.
    pub fn pending_high_score(&self) -> Option<u32> {
        self.pending_score.map(|pending| pending.score)
    }

    pub fn current_timer(&self, kind: TimerKind) -> Option<TimerId> {
        self.timers.current(kind)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        core::mem::take(&mut self.effects)
    }

    /// Applies one event. Events whose guard does not hold are ignored.
    pub fn dispatch(&mut self, event: GameEvent) -> Update {
        use GameEvent::*;

        log::trace!("dispatch {:?} while {:?}", event, self.state.status);
        let status_before = self.state.status;
        let update = match event {
            Start => self.start(),
            Pause => self.pause(),
            Resume => self.resume(),
            Restart => self.restart(),
            Exit => self.exit(),
            SelectCard(id) => self.select_card(id),
            ChangeDifficulty(difficulty) => self.change_difficulty(difficulty),
            SubmitName(name) => self.submit_name(&name),
            TimerFired(id) => self.fire_timer(id),
        };

        if update.has_update() {
            self.settle();
        }
        if self.state.status != status_before {
            log::debug!("{:?} -> {:?}", status_before, self.state.status);
        }
        update
    }

    /// Forwards queued timer requests to `scheduler` and fires whatever falls due within `duration_ms` of virtual time.
    /// Every other effect is handed back.
    pub fn advance(&mut self, scheduler: &mut VirtualScheduler, duration_ms: u64) -> Vec<Effect> {
        let until_ms = scheduler.now_ms().saturating_add(duration_ms);
        let mut passed = Vec::new();
        loop {
            for effect in self.take_effects() {
                match effect {
                    Effect::Timer(request) => scheduler.apply(request),
                    other => passed.push(other),
                }
            }
            let Some(id) = scheduler.pop_due(until_ms) else {
                break;
            };
            self.dispatch(GameEvent::TimerFired(id));
        }
        passed
    }

    /// Transitions implied by the state itself, evaluated after every mutation.
    fn settle(&mut self) {
        use GameStatus::*;
        match self.state.status {
            Countdown if self.state.countdown_value == 0 => self.begin_playing(),
            Playing if self.state.all_matched() => self.complete(),
            _ => {}
        }
    }

    fn start(&mut self) -> Update {
        if self.state.status != GameStatus::Menu {
            return Update::NoChange;
        }
        self.begin_countdown();
        Update::Changed
    }

    fn restart(&mut self) -> Update {
        if !self.state.status.is_in_round() {
            return Update::NoChange;
        }
        self.begin_countdown();
        Update::Changed
    }

    fn pause(&mut self) -> Update {
        if self.state.status != GameStatus::Playing {
            return Update::NoChange;
        }
        self.state.status = GameStatus::Paused;
        self.disarm(TimerKind::Elapsed);
        Update::Changed
    }

    fn resume(&mut self) -> Update {
        if self.state.status != GameStatus::Paused {
            return Update::NoChange;
        }
        self.state.status = GameStatus::Playing;
        self.arm(TimerKind::Elapsed, self.config.elapsed_tick_ms, true);
        Update::Changed
    }

    fn exit(&mut self) -> Update {
        if !self.state.status.is_in_round() {
            return Update::NoChange;
        }
        for kind in TimerKind::ALL {
            self.disarm(kind);
        }
        self.pending_score = None;
        self.state = GameState::initial(self.state.difficulty, self.config.countdown_from);
        self.state.cards = self.deal();
        Update::Changed
    }

    fn change_difficulty(&mut self, difficulty: Difficulty) -> Update {
        if self.state.status != GameStatus::Menu {
            return Update::NoChange;
        }
        self.state.difficulty = difficulty;
        self.state.cards = self.deal();
        Update::Changed
    }

    fn select_card(&mut self, id: CardId) -> Update {
        if self.state.status != GameStatus::Playing || self.state.has_pending_pair() {
            return Update::NoChange;
        }

        let Some(card) = self.state.card_mut(id) else {
            return Update::NoChange;
        };
        if !card.is_selectable() {
            return Update::NoChange;
        }
        card.is_flipped = true;
        self.effects.push(Effect::Feedback(Sound::Flip));

        if self.state.first_selected.is_none() {
            self.state.first_selected = Some(id);
        } else {
            self.state.second_selected = Some(id);
            self.revealed_at_ms = self.state.elapsed_ms;
            self.arm(TimerKind::Resolution, self.config.resolution_delay_ms, false);
        }
        Update::Changed
    }

    fn submit_name(&mut self, name: &str) -> Update {
        let Some(pending) = self.pending_score.filter(|_| self.state.status.is_final()) else {
            return Update::NoChange;
        };

        match self
            .high_scores
            .record(name, pending.score, pending.time_secs, pending.difficulty)
        {
            Ok(entry) => {
                self.pending_score = None;
                self.effects.push(Effect::ScoreSaved {
                    name: entry.name,
                    score: entry.score,
                });
                Update::Changed
            }
            Err(err) => {
                log::error!("Could not save high score: {}", err);
                self.effects.push(Effect::SaveFailed(err));
                Update::NoChange
            }
        }
    }

    fn fire_timer(&mut self, id: TimerId) -> Update {
        if !self.timers.is_current(id) {
            log::trace!("ignoring stale timer {:?}", id);
            return Update::NoChange;
        }

        match id.kind {
            TimerKind::Countdown => self.tick_countdown(),
            TimerKind::Elapsed => self.tick_elapsed(),
            TimerKind::Resolution => {
                self.timers.complete(id);
                self.resolve_pair()
            }
        }
    }

    fn tick_countdown(&mut self) -> Update {
        if self.state.status != GameStatus::Countdown || self.state.countdown_value == 0 {
            return Update::NoChange;
        }
        self.state.countdown_value -= 1;
        Update::Changed
    }

    fn tick_elapsed(&mut self) -> Update {
        if self.state.status != GameStatus::Playing {
            return Update::NoChange;
        }
        self.state.elapsed_ms = self
            .state
            .elapsed_ms
            .saturating_add(self.config.elapsed_tick_ms.into());
        Update::Changed
    }

    /// Compares the two revealed cards. A pair revealed while playing still resolves if the game got paused in
    /// between.
    fn resolve_pair(&mut self) -> Update {
        if !matches!(self.state.status, GameStatus::Playing | GameStatus::Paused) {
            return Update::NoChange;
        }
        let (Some(first), Some(second)) = (self.state.first_selected, self.state.second_selected)
        else {
            return Update::NoChange;
        };

        let matched = match (self.state.card(first), self.state.card(second)) {
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        };
        let delta = score_event(matched, self.revealed_at_ms, self.state.streak);

        for id in [first, second] {
            if let Some(card) = self.state.card_mut(id) {
                if matched {
                    card.is_matched = true;
                } else {
                    card.is_flipped = false;
                }
            }
        }

        self.state.score = apply_delta(self.state.score, delta);
        if matched {
            self.state.streak = self.state.streak.saturating_add(1);
            self.effects.push(Effect::Feedback(Sound::Match));
        } else {
            self.state.streak = 0;
            self.effects.push(Effect::Feedback(Sound::Mismatch));
        }
        self.state.first_selected = None;
        self.state.second_selected = None;

        log::debug!(
            "cards {} and {} {}, delta {}, score {}, streak {}",
            first,
            second,
            if matched { "matched" } else { "mismatched" },
            delta,
            self.state.score,
            self.state.streak
        );
        Update::Changed
    }

    fn begin_countdown(&mut self) {
        self.disarm(TimerKind::Elapsed);
        self.disarm(TimerKind::Resolution);
        self.pending_score = None;

        let difficulty = self.state.difficulty;
        self.state = GameState::initial(difficulty, self.config.countdown_from);
        self.state.cards = self.deal();
        self.state.status = GameStatus::Countdown;
        self.arm(TimerKind::Countdown, self.config.countdown_tick_ms, true);
    }

    fn begin_playing(&mut self) {
        self.disarm(TimerKind::Countdown);
        self.state.status = GameStatus::Playing;
        self.state.first_selected = None;
        self.state.second_selected = None;
        self.arm(TimerKind::Elapsed, self.config.elapsed_tick_ms, true);
    }

    fn complete(&mut self) {
        self.disarm(TimerKind::Elapsed);
        self.disarm(TimerKind::Resolution);
        self.state.status = GameStatus::Completed;
        self.effects.push(Effect::Feedback(Sound::Win));

        let score = self.state.score;
        let difficulty = self.state.difficulty;
        log::debug!(
            "completed {} with {} points in {} s",
            difficulty,
            score,
            self.state.elapsed_secs()
        );

        if self.high_scores.is_new_high_score(score, difficulty) {
            self.pending_score = Some(PendingScore {
                score,
                time_secs: self.state.elapsed_secs(),
                difficulty,
            });
            self.effects.push(Effect::PromptName { score, difficulty });
        }
    }

    fn deal(&mut self) -> Vec<Card> {
        let seed: u64 = self.seeds.random();
        RandomDeckGenerator::new(seed, self.catalog).generate(self.state.difficulty)
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u32, repeating: bool) {
        let request = self.timers.arm(kind, delay_ms, repeating);
        self.effects.push(Effect::Timer(request));
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(request) = self.timers.disarm(kind) {
            self.effects.push(Effect::Timer(request));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameEvent::*;

    struct Harness {
        game: Game<MemoryStore>,
        clock: VirtualScheduler,
        effects: Vec<Effect>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with(GameConfig::default(), MemoryStore::new())
        }

        fn with(config: GameConfig, storage: MemoryStore) -> Self {
            let mut harness = Self {
                game: Game::new(config, storage, 1).unwrap(),
                clock: VirtualScheduler::new(),
                effects: Vec::new(),
            };
            harness.run(0);
            harness
        }

        fn send(&mut self, event: GameEvent) -> Update {
            let update = self.game.dispatch(event);
            self.run(0);
            update
        }

        fn run(&mut self, ms: u64) {
            let effects = self.game.advance(&mut self.clock, ms);
            self.effects.extend(effects);
        }

        fn state(&self) -> &GameState {
            self.game.state()
        }

        fn playing() -> Self {
            let mut harness = Self::new();
            harness.send(Start);
            harness.run(3000);
            assert_eq!(harness.state().status, GameStatus::Playing);
            harness.effects.clear();
            harness
        }

        fn open_cards(&self) -> impl Iterator<Item = &Card> {
            self.state().cards.iter().filter(|card| !card.is_matched)
        }

        fn matching_pair(&self) -> (CardId, CardId) {
            let first = self.open_cards().next().unwrap();
            let second = self.open_cards().find(|card| card.matches(first)).unwrap();
            (first.id, second.id)
        }

        fn mismatched_pair(&self) -> (CardId, CardId) {
            let first = self.open_cards().next().unwrap();
            let second = self
                .open_cards()
                .find(|card| card.id != first.id && !card.matches(first))
                .unwrap();
            (first.id, second.id)
        }

        fn turn(&mut self, (a, b): (CardId, CardId)) {
            self.send(SelectCard(a));
            self.send(SelectCard(b));
            self.run(1000);
        }

        fn finish_round(&mut self) {
            while self.state().status == GameStatus::Playing {
                let pair = self.matching_pair();
                self.turn(pair);
            }
        }
    }

    #[test]
    fn menu_shows_a_preview_deck() {
        let harness = Harness::new();
        assert_eq!(harness.state().status, GameStatus::Menu);
        assert_eq!(harness.state().cards.len(), 16);
        assert_eq!(harness.state().countdown_value, 3);
    }

    #[test]
    fn start_counts_down_into_play() {
        let mut harness = Harness::new();
        assert_eq!(harness.send(Start), Update::Changed);
        assert_eq!(harness.state().status, GameStatus::Countdown);
        assert!(harness.clock.is_scheduled(TimerKind::Countdown));

        harness.run(1000);
        assert_eq!(harness.state().countdown_value, 2);
        harness.run(1999);
        assert_eq!(harness.state().status, GameStatus::Countdown);
        assert_eq!(harness.state().countdown_value, 1);

        harness.run(1);
        assert_eq!(harness.state().status, GameStatus::Playing);
        assert_eq!(harness.state().elapsed_ms, 0);
        assert!(!harness.clock.is_scheduled(TimerKind::Countdown));
        assert!(harness.clock.is_scheduled(TimerKind::Elapsed));
    }

    #[test]
    fn zero_countdown_starts_play_immediately() {
        let config = GameConfig {
            countdown_from: 0,
            ..GameConfig::default()
        };
        let mut harness = Harness::with(config, MemoryStore::new());

        harness.send(Start);

        assert_eq!(harness.state().status, GameStatus::Playing);
    }

    #[test]
    fn elapsed_time_accumulates_only_while_playing() {
        let mut harness = Harness::playing();
        harness.run(550);
        assert_eq!(harness.state().elapsed_ms, 500);

        harness.send(Pause);
        harness.run(5000);
        assert_eq!(harness.state().elapsed_ms, 500);

        harness.send(Resume);
        harness.run(200);
        assert_eq!(harness.state().elapsed_ms, 700);
    }

    #[test]
    fn pausing_twice_changes_nothing() {
        let mut harness = Harness::playing();
        harness.send(Pause);
        let paused = harness.state().clone();

        assert_eq!(harness.send(Pause), Update::NoChange);
        assert_eq!(harness.state(), &paused);
    }

    #[test]
    fn resume_only_from_paused() {
        let mut harness = Harness::playing();
        assert_eq!(harness.send(Resume), Update::NoChange);
        assert_eq!(Harness::new().send(Pause), Update::NoChange);
    }

    #[test]
    fn selecting_during_countdown_is_ignored() {
        let mut harness = Harness::new();
        harness.send(Start);
        let id = harness.state().cards[0].id;

        assert_eq!(harness.send(SelectCard(id)), Update::NoChange);
        assert!(!harness.state().cards[0].is_flipped);
    }

    #[test]
    fn matching_pair_scores_and_extends_streak() {
        let mut harness = Harness::playing();
        let (a, b) = harness.matching_pair();

        harness.send(SelectCard(a));
        harness.send(SelectCard(b));
        assert_eq!(harness.state().first_selected, Some(a));
        assert_eq!(harness.state().second_selected, Some(b));
        assert!(harness.state().card(b).unwrap().is_flipped);

        harness.run(999);
        assert!(!harness.state().card(a).unwrap().is_matched);

        harness.run(1);
        let state = harness.state();
        assert!(state.card(a).unwrap().is_matched);
        assert!(state.card(b).unwrap().is_matched);
        assert_eq!(state.first_selected, None);
        assert_eq!(state.second_selected, None);
        assert_eq!(state.streak, 1);
        assert_eq!(state.score, 30);
        assert!(harness.effects.contains(&Effect::Feedback(Sound::Flip)));
        assert!(harness.effects.contains(&Effect::Feedback(Sound::Match)));
    }

    #[test]
    fn time_bonus_counts_from_the_reveal() {
        let mut harness = Harness::playing();
        harness.run(500);
        let pair = harness.matching_pair();

        harness.turn(pair);

        assert_eq!(harness.state().elapsed_ms, 1500);
        assert_eq!(harness.state().score, 30);
    }

    #[test]
    fn back_to_back_matches_earn_streak_bonus() {
        let mut harness = Harness::playing();
        let pair = harness.matching_pair();
        harness.turn(pair);
        assert_eq!(harness.state().score, 30);

        let pair = harness.matching_pair();
        harness.turn(pair);

        // revealed at 1 s: 10 + 19 + 1 * 5
        assert_eq!(harness.state().streak, 2);
        assert_eq!(harness.state().score, 64);
    }

    #[test]
    fn mismatch_flips_back_and_never_goes_negative() {
        let mut harness = Harness::playing();
        let (a, b) = harness.mismatched_pair();

        harness.turn((a, b));

        let state = harness.state();
        assert!(!state.card(a).unwrap().is_flipped);
        assert!(!state.card(b).unwrap().is_flipped);
        assert_eq!(state.score, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.first_selected, None);
        assert!(harness.effects.contains(&Effect::Feedback(Sound::Mismatch)));
    }

    #[test]
    fn mismatch_resets_streak_and_costs_five() {
        let mut harness = Harness::playing();
        let pair = harness.matching_pair();
        harness.turn(pair);
        let after_match = harness.state().score;
        assert_eq!(harness.state().streak, 1);

        let pair = harness.mismatched_pair();
        harness.turn(pair);

        assert_eq!(harness.state().streak, 0);
        assert_eq!(harness.state().score, after_match - 5);
    }

    #[test]
    fn no_third_selection_while_pair_pending() {
        let mut harness = Harness::playing();
        let (a, b) = harness.mismatched_pair();
        harness.send(SelectCard(a));
        harness.send(SelectCard(b));
        let third = harness
            .open_cards()
            .find(|card| card.id != a && card.id != b)
            .unwrap()
            .id;

        assert_eq!(harness.send(SelectCard(third)), Update::NoChange);
        assert!(!harness.state().card(third).unwrap().is_flipped);
    }

    #[test]
    fn flipped_matched_and_unknown_cards_are_rejected() {
        let mut harness = Harness::playing();
        let pair = harness.matching_pair();
        harness.turn(pair);

        assert_eq!(harness.send(SelectCard(pair.0)), Update::NoChange);
        assert_eq!(harness.send(SelectCard(CardId::MAX)), Update::NoChange);

        let (a, _) = harness.matching_pair();
        harness.send(SelectCard(a));
        assert_eq!(harness.send(SelectCard(a)), Update::NoChange);
        assert_eq!(harness.state().second_selected, None);
    }

    #[test]
    fn pair_revealed_before_pause_still_resolves() {
        let mut harness = Harness::playing();
        let (a, b) = harness.matching_pair();
        harness.send(SelectCard(a));
        harness.send(SelectCard(b));
        harness.send(Pause);
        let elapsed = harness.state().elapsed_ms;

        harness.run(1000);

        assert!(harness.state().card(a).unwrap().is_matched);
        assert_eq!(harness.state().status, GameStatus::Paused);
        assert_eq!(harness.state().elapsed_ms, elapsed);
    }

    #[test]
    fn matching_everything_completes_and_stops_the_clock() {
        let mut harness = Harness::playing();
        let mut stale_tick = None;
        while harness.state().status == GameStatus::Playing {
            stale_tick = harness.game.current_timer(TimerKind::Elapsed);
            let pair = harness.matching_pair();
            harness.turn(pair);
        }

        assert_eq!(harness.state().status, GameStatus::Completed);
        assert!(harness.state().all_matched());
        assert_eq!(harness.state().matched_pairs(), 8);
        assert!(harness.effects.contains(&Effect::Feedback(Sound::Win)));
        assert!(!harness.clock.is_scheduled(TimerKind::Elapsed));

        let elapsed = harness.state().elapsed_ms;
        harness.run(5000);
        assert_eq!(harness.state().elapsed_ms, elapsed);

        let update = harness.send(TimerFired(stale_tick.unwrap()));
        assert_eq!(update, Update::NoChange);
        assert_eq!(harness.state().elapsed_ms, elapsed);
    }

    #[test]
    fn qualifying_round_prompts_for_a_name_and_records_it() {
        let mut harness = Harness::playing();
        harness.finish_round();
        let score = harness.state().score;
        let time_secs = harness.state().elapsed_secs();
        assert!(harness.effects.contains(&Effect::PromptName {
            score,
            difficulty: Difficulty::Easy
        }));
        assert_eq!(harness.game.pending_high_score(), Some(score));

        assert_eq!(harness.send(SubmitName(" Ada ".to_string())), Update::Changed);

        assert!(harness.effects.contains(&Effect::ScoreSaved {
            name: "Ada".to_string(),
            score
        }));
        assert_eq!(harness.game.pending_high_score(), None);
        let entries = harness.game.high_scores().list_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, score);
        assert_eq!(entries[0].time_secs, time_secs);
        assert_eq!(harness.send(SubmitName("Ada".to_string())), Update::NoChange);
    }

    #[test]
    fn non_qualifying_round_does_not_prompt() {
        let mut storage = MemoryStore::new();
        let board: Vec<_> = (0..5)
            .map(|_| {
                serde_json::json!({
                    "name": "pro",
                    "score": 10_000,
                    "time": 1,
                    "difficulty": "easy",
                    "date": "2024-01-01T00:00:00Z",
                })
            })
            .collect();
        storage.insert(HIGH_SCORES_KEY, serde_json::to_string(&board).unwrap());
        let mut harness = Harness::with(GameConfig::default(), storage);
        harness.send(Start);
        harness.run(3000);

        harness.finish_round();

        assert_eq!(harness.state().status, GameStatus::Completed);
        assert!(
            !harness
                .effects
                .iter()
                .any(|effect| matches!(effect, Effect::PromptName { .. }))
        );
        assert_eq!(harness.send(SubmitName("Ada".to_string())), Update::NoChange);
    }

    #[test]
    fn failed_save_keeps_the_round_intact() {
        let mut harness = Harness::with(GameConfig::default(), MemoryStore::with_quota(10));
        harness.send(Start);
        harness.run(3000);
        harness.finish_round();
        let finished = harness.state().clone();

        let update = harness.send(SubmitName("Ada".to_string()));

        assert_eq!(update, Update::NoChange);
        assert!(
            harness
                .effects
                .contains(&Effect::SaveFailed(StoreError::Storage(StorageError::QuotaExceeded)))
        );
        assert_eq!(harness.state(), &finished);
        assert_eq!(harness.game.pending_high_score(), Some(finished.score));
    }

    #[test]
    fn restart_deals_a_fresh_round() {
        let mut harness = Harness::playing();
        let pair = harness.matching_pair();
        harness.turn(pair);
        harness.finish_round();

        assert_eq!(harness.send(Restart), Update::Changed);

        let state = harness.state();
        assert_eq!(state.status, GameStatus::Countdown);
        assert_eq!(state.score, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.elapsed_ms, 0);
        assert_eq!(state.countdown_value, 3);
        assert!(state.cards.iter().all(|card| !card.is_face_up()));
        assert_eq!(harness.game.pending_high_score(), None);
    }

    #[test]
    fn stale_resolution_after_restart_is_ignored() {
        let mut harness = Harness::playing();
        let (a, b) = harness.matching_pair();
        harness.send(SelectCard(a));
        harness.send(SelectCard(b));
        let resolution = harness.game.current_timer(TimerKind::Resolution).unwrap();

        harness.send(Restart);
        harness.run(3000);

        assert_eq!(harness.send(TimerFired(resolution)), Update::NoChange);
        assert_eq!(harness.state().score, 0);
        assert_eq!(harness.state().matched_pairs(), 0);
    }

    #[test]
    fn exit_returns_to_menu_keeping_difficulty() {
        let mut harness = Harness::new();
        harness.send(ChangeDifficulty(Difficulty::Medium));
        harness.send(Start);
        harness.run(3000);
        let pair = harness.matching_pair();
        harness.turn(pair);

        assert_eq!(harness.send(Exit), Update::Changed);

        let state = harness.state();
        assert_eq!(state.status, GameStatus::Menu);
        assert_eq!(state.difficulty, Difficulty::Medium);
        assert_eq!(state.score, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.cards.len(), 36);
        for kind in TimerKind::ALL {
            assert!(!harness.clock.is_scheduled(kind));
        }
    }

    #[test]
    fn exit_is_ignored_in_menu() {
        assert_eq!(Harness::new().send(Exit), Update::NoChange);
    }

    #[test]
    fn difficulty_changes_only_in_menu() {
        let mut harness = Harness::new();
        assert_eq!(harness.send(ChangeDifficulty(Difficulty::Hard)), Update::Changed);
        assert_eq!(harness.state().cards.len(), 64);

        harness.send(Start);
        assert_eq!(harness.send(ChangeDifficulty(Difficulty::Easy)), Update::NoChange);
        assert_eq!(harness.state().difficulty, Difficulty::Hard);
        assert_eq!(harness.state().cards.len(), 64);
    }
}
