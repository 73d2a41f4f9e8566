use crate::leaderboard::{LeaderboardView, NameEntryView, ScoreBoard};
use crate::settings;
use crate::utils::*;
use gloo::timers::callback::{Interval, Timeout};
use quiet_recall_core::{
    self as core, Card, Difficulty, DifficultyFilter, Effect, GameConfig, GameEvent, GameStatus,
    Sound, TimerKind, TimerRequest, format_time,
};
use std::collections::BTreeMap;
use yew::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Game(GameEvent),
    ToggleLeaderboard,
    LeaderboardFilter(DifficultyFilter),
    DismissNotice,
}

#[derive(Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    pub seed: Option<u64>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    card: Card,
    disabled: bool,
    callback: Callback<GameEvent>,
}

#[function_component(CardTile)]
fn card_component(props: &CardProps) -> Html {
    let CardProps {
        card,
        disabled,
        callback,
    } = props.clone();

    let class = classes!(
        "card",
        card.is_flipped.then_some("flipped"),
        card.is_matched.then_some("matched"),
        disabled.then_some("disabled"),
    );

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card {} clicked", card.id);
        callback.emit(GameEvent::SelectCard(card.id));
    });

    html! {
        <button {class} {onclick} disabled={disabled}>
            if card.is_face_up() {
                {card.symbol.glyph()}
            } else {
                {"?"}
            }
        </button>
    }
}

/// Browser timer backing one [`TimerKind`], dropping it cancels it.
enum TimerHandle {
    Once { _timeout: Timeout },
    Every { _interval: Interval },
}

impl TimerHandle {
    fn start(delay_ms: u32, repeating: bool, fire: impl Fn() + 'static) -> Self {
        if repeating {
            Self::Every {
                _interval: Interval::new(delay_ms, fire),
            }
        } else {
            Self::Once {
                _timeout: Timeout::new(delay_ms, fire),
            }
        }
    }

    fn is_repeating(&self) -> bool {
        matches!(self, Self::Every { .. })
    }
}

pub(crate) struct GameView {
    game: core::Game<BrowserStorage>,
    settings: settings::Settings,
    timers: BTreeMap<TimerKind, TimerHandle>,
    leaderboard_open: bool,
    leaderboard_filter: DifficultyFilter,
    scores: ScoreBoard,
    name_prompt: Option<u32>,
    notice: Option<String>,
}

impl GameView {
    /// Hands queued effects to the browser, returns whether any of them changed what is shown.
    fn apply_effects(&mut self, ctx: &Context<Self>) -> bool {
        let mut shown = false;
        for effect in self.game.take_effects() {
            match effect {
                Effect::Timer(TimerRequest::Start {
                    id,
                    delay_ms,
                    repeating,
                }) => {
                    let link = ctx.link().clone();
                    let fire = move || link.send_message(Msg::Game(GameEvent::TimerFired(id)));
                    let handle = TimerHandle::start(delay_ms, repeating, fire);
                    log::trace!("{:?} timer started, repeating: {}", id, handle.is_repeating());
                    self.timers.insert(id.kind, handle);
                }
                Effect::Timer(TimerRequest::Cancel { kind }) => {
                    self.timers.remove(&kind);
                }
                Effect::Feedback(sound) => play_sound(sound),
                Effect::PromptName { score, difficulty } => {
                    log::debug!("new high score {} on {}", score, difficulty);
                    self.name_prompt = Some(score);
                    shown = true;
                }
                Effect::ScoreSaved { name, score } => {
                    self.name_prompt = None;
                    self.refresh_scores();
                    self.notice = Some(format!("High score saved! {}: {} points", name, score));
                    shown = true;
                }
                Effect::SaveFailed(err) => {
                    self.notice = Some(format!("Could not save high score: {}", err));
                    shown = true;
                }
            }
        }
        shown
    }

    fn dispatch(&mut self, ctx: &Context<Self>, event: GameEvent) -> bool {
        let changed_difficulty = match event {
            GameEvent::ChangeDifficulty(difficulty) => Some(difficulty),
            _ => None,
        };
        let leaving_round = matches!(event, GameEvent::Restart | GameEvent::Exit);

        let updated = self.game.dispatch(event).has_update();
        if updated {
            if let Some(difficulty) = changed_difficulty {
                self.settings.difficulty = difficulty;
                self.settings.local_save();
                self.refresh_scores();
            }
            if leaving_round {
                self.name_prompt = None;
            }
        }

        let shown = self.apply_effects(ctx);
        updated || shown
    }

    fn refresh_scores(&mut self) {
        self.scores.refresh(
            self.game.high_scores(),
            self.game.state().difficulty,
            self.leaderboard_filter,
        );
    }

    fn view_controls(&self, ctx: &Context<Self>) -> Html {
        let status = self.game.status();
        let send = |event: GameEvent| {
            ctx.link()
                .callback(move |_: MouseEvent| Msg::Game(event.clone()))
        };
        let leaderboard = ctx.link().callback(|_: MouseEvent| Msg::ToggleLeaderboard);

        match status {
            GameStatus::Menu => {
                let current = self.game.state().difficulty;
                html! {
                    <nav class="controls">
                        {
                            for Difficulty::ALL.into_iter().map(|difficulty| {
                                let class = classes!((difficulty == current).then_some("active"));
                                let edge = difficulty.grid_size();
                                html! {
                                    <button {class} onclick={send(GameEvent::ChangeDifficulty(difficulty))}>
                                        {format!("{} ({}x{})", difficulty, edge, edge)}
                                    </button>
                                }
                            })
                        }
                        <button onclick={send(GameEvent::Start)}>{"Start Game"}</button>
                        <button onclick={leaderboard}>{"Leaderboard"}</button>
                    </nav>
                }
            }
            GameStatus::Countdown => html! {},
            GameStatus::Playing | GameStatus::Paused => html! {
                <nav class="controls">
                    <button onclick={send(GameEvent::Exit)}>{"Exit"}</button>
                    if status == GameStatus::Playing {
                        <button onclick={send(GameEvent::Pause)}>{"Pause"}</button>
                    } else {
                        <button onclick={send(GameEvent::Resume)}>{"Resume"}</button>
                    }
                    <button onclick={send(GameEvent::Restart)}>{"Restart"}</button>
                </nav>
            },
            GameStatus::Completed => html! {
                <nav class="controls">
                    <button onclick={send(GameEvent::Restart)}>{"Play Again"}</button>
                    <button onclick={send(GameEvent::Exit)}>{"Main Menu"}</button>
                    <button onclick={leaderboard}>{"Leaderboard"}</button>
                </nav>
            },
        }
    }

    fn view_board(&self, ctx: &Context<Self>) -> Html {
        let state = self.game.state();
        let disabled = state.status != GameStatus::Playing || state.has_pending_pair();
        let callback = ctx.link().callback(Msg::Game);
        let class = classes!("board", format!("grid-{}", state.difficulty.grid_size()));

        html! {
            <div {class}>
                {
                    for state.cards.iter().map(|&card| html! {
                        <CardTile key={card.id.to_string()} {card} {disabled} callback={callback.clone()}/>
                    })
                }
            </div>
        }
    }

    fn view_score(&self) -> Html {
        let state = self.game.state();
        let best = match state.status {
            GameStatus::Completed => None,
            _ => self.scores.best,
        };

        html! {
            <header class="score">
                <span>{format!("Score: {}", state.score)}</span>
                <span>{format!("Time: {}", format_time(state.elapsed_secs()))}</span>
                if state.streak > 1 {
                    <span>{format!("Streak: {}", state.streak)}</span>
                }
                if let Some(best) = best {
                    <span>{format!("Best: {}", best)}</span>
                }
            </header>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let GameProps { seed, difficulty } = ctx.props().clone();
        let settings: settings::Settings = LocalOrDefault::local_or_default();
        let seed = seed.unwrap_or_else(js_random_seed);

        let game = core::Game::new(GameConfig::default(), BrowserStorage, seed)
            .expect("symbol catalog must cover every difficulty");

        let mut view = Self {
            game,
            settings,
            timers: BTreeMap::new(),
            leaderboard_open: false,
            leaderboard_filter: DifficultyFilter::All,
            scores: ScoreBoard::default(),
            name_prompt: None,
            notice: None,
        };
        let difficulty = difficulty.unwrap_or(view.settings.difficulty);
        view.dispatch(ctx, GameEvent::ChangeDifficulty(difficulty));
        view.refresh_scores();
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Game(event) => self.dispatch(ctx, event),
            ToggleLeaderboard => {
                self.leaderboard_open = !self.leaderboard_open;
                if self.leaderboard_open {
                    self.refresh_scores();
                }
                true
            }
            LeaderboardFilter(filter) => {
                let updated = self.leaderboard_filter != filter;
                self.leaderboard_filter = filter;
                if updated {
                    self.refresh_scores();
                }
                updated
            }
            DismissNotice => self.notice.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let state = self.game.state();

        let content = match state.status {
            GameStatus::Menu => html! {
                <section class="menu">
                    <h1>{"Quiet Recall"}</h1>
                    <p>{"Test your memory with this matching game"}</p>
                    {self.view_controls(ctx)}
                </section>
            },
            GameStatus::Countdown => html! {
                <section class="countdown">
                    <h1>{state.countdown_value}</h1>
                </section>
            },
            GameStatus::Playing | GameStatus::Paused => html! {
                <section class="round">
                    {self.view_score()}
                    {self.view_controls(ctx)}
                    if state.status == GameStatus::Paused {
                        <div class="paused">
                            <h2>{"Game Paused"}</h2>
                            <p>{"Click Resume to continue"}</p>
                        </div>
                    } else {
                        {self.view_board(ctx)}
                    }
                </section>
            },
            GameStatus::Completed => html! {
                <section class="round completed">
                    {self.view_score()}
                    {self.view_controls(ctx)}
                    {self.view_board(ctx)}
                    <div class="summary">
                        <h2>{"Game Complete!"}</h2>
                        <p>{format!("Final score: {}", state.score)}</p>
                        <p>{format!("Time: {}", format_time(state.elapsed_secs()))}</p>
                    </div>
                </section>
            },
        };

        let entries = self.scores.entries.clone();
        let on_filter = ctx.link().callback(Msg::LeaderboardFilter);
        let on_close = ctx.link().callback(|_: ()| Msg::ToggleLeaderboard);
        let on_submit = ctx
            .link()
            .callback(|name: String| Msg::Game(GameEvent::SubmitName(name)));
        let dismiss = ctx.link().callback(|_: MouseEvent| Msg::DismissNotice);

        html! {
            <div class="quiet-recall">
                {content}
                <LeaderboardView
                    open={self.leaderboard_open}
                    filter={self.leaderboard_filter}
                    {entries}
                    {on_filter}
                    {on_close}
                />
                if let Some(score) = self.name_prompt {
                    <NameEntryView {score} {on_submit}/>
                }
                if let Some(notice) = &self.notice {
                    <aside class="notice" onclick={dismiss}>{notice}</aside>
                }
            </div>
        }
    }
}

/// There are no sound assets, cues only show up in the console.
fn play_sound(sound: Sound) {
    log::debug!("Playing {:?} sound", sound);
}
