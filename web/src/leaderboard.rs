use quiet_recall_core::{
    Difficulty, DifficultyFilter, HighScoreEntry, HighScoreStore, KeyValueStore, MAX_NAME_CHARS,
    format_time,
};
use web_sys::HtmlInputElement;
use yew::prelude::*;

const TABS: [(&str, DifficultyFilter); 4] = [
    ("All", DifficultyFilter::All),
    ("Easy", DifficultyFilter::Only(Difficulty::Easy)),
    ("Medium", DifficultyFilter::Only(Difficulty::Medium)),
    ("Hard", DifficultyFilter::Only(Difficulty::Hard)),
];

/// Scores read from storage, kept between renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ScoreBoard {
    pub best: Option<u32>,
    pub entries: Vec<HighScoreEntry>,
}

impl ScoreBoard {
    pub fn refresh<S: KeyValueStore>(
        &mut self,
        store: &HighScoreStore<S>,
        difficulty: Difficulty,
        filter: DifficultyFilter,
    ) {
        self.best = store.best_for(difficulty);
        self.entries = store.leaderboard(filter);
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct LeaderboardProps {
    pub open: bool,
    pub filter: DifficultyFilter,
    pub entries: Vec<HighScoreEntry>,
    pub on_filter: Callback<DifficultyFilter>,
    pub on_close: Callback<()>,
}

#[function_component]
pub(crate) fn LeaderboardView(props: &LeaderboardProps) -> Html {
    let on_close = props.on_close.reform(|_: MouseEvent| ());

    html! {
        <dialog id="leaderboard" open={props.open}>
            <article>
                <h2>{"Leaderboard"}</h2>
                <nav>
                    {
                        for TABS.iter().map(|&(label, filter)| {
                            let class = classes!((filter == props.filter).then_some("active"));
                            let onclick = props.on_filter.reform(move |_: MouseEvent| filter);
                            html! { <button {class} {onclick}>{label}</button> }
                        })
                    }
                </nav>
                if props.entries.is_empty() {
                    <p>{"No high scores yet"}</p>
                } else {
                    <table>
                        <tr><th>{"Rank"}</th><th>{"Player"}</th><th>{"Score"}</th><th>{"Time"}</th></tr>
                        {
                            for props.entries.iter().enumerate().map(|(rank, entry)| html! {
                                <tr>
                                    <td>{format!("#{}", rank + 1)}</td>
                                    <td>{&entry.name}</td>
                                    <td>{entry.score}</td>
                                    <td>{format_time(entry.time_secs)}</td>
                                </tr>
                            })
                        }
                    </table>
                }
                <footer>
                    <button onclick={on_close}>{"Close"}</button>
                </footer>
            </article>
        </dialog>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct NameEntryProps {
    pub score: u32,
    pub on_submit: Callback<String>,
}

#[function_component]
pub(crate) fn NameEntryView(props: &NameEntryProps) -> Html {
    let name = use_state(String::new);

    let oninput = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let onsubmit = {
        let name = name.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if !name.trim().is_empty() {
                on_submit.emit(name.trim().to_string());
            }
        })
    };

    html! {
        <dialog id="name-entry" open={true}>
            <article>
                <h2>{format!("New High Score: {}", props.score)}</h2>
                <form {onsubmit}>
                    <label for="name">{"Enter your name:"}</label>
                    <input
                        id="name"
                        type="text"
                        placeholder="Your name"
                        required={true}
                        maxlength={MAX_NAME_CHARS.to_string()}
                        value={(*name).clone()}
                        {oninput}
                    />
                    <button type="submit" disabled={name.trim().is_empty()}>{"Save Score"}</button>
                </form>
            </article>
        </dialog>
    }
}
