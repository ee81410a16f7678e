use crate::platform::{AlertNotifier, BrowserClock, LocalRecordStore};
use crate::settings::SettingsView;
use crate::utils::*;
use bitflags::bitflags;
use clap::Args;
use gloo::timers::callback::Interval;
use sapper_core as game;
use yew::prelude::*;

type BrowserSession = game::Session<LocalRecordStore, AlertNotifier, BrowserClock>;

pub trait HasUpdate {
    fn has_update(self) -> bool;
}

impl HasUpdate for game::Result<game::FlagOutcome> {
    fn has_update(self) -> bool {
        self.inspect_err(|err| log::warn!("flag rejected: {}", err))
            .is_ok_and(|outcome| outcome.has_update())
    }
}

impl HasUpdate for game::Result<game::RevealOutcome> {
    fn has_update(self) -> bool {
        self.inspect_err(|err| log::warn!("reveal rejected: {}", err))
            .is_ok_and(|outcome| outcome.has_update())
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CellPointerState {
    pos: game::Coord2,
    buttons: MouseButtons,
}

impl CellPointerState {
    /// Only a lone left button pushes the hovered cell down.
    fn shows_pressed(self) -> bool {
        self.buttons == MouseButtons::LEFT
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellMsg {
    Update(CellPointerState),
    Leave,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    CellEvent(CellMsg),
    UpdateTime,
    SelectDifficulty(game::Difficulty),
    EditConfig(game::BoardConfig),
    RejectEdit(game::GameError),
    StartGame,
}

/// Player action decided once all buttons are released over a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
enum CellAction {
    Reveal,
    ToggleFlag,
    Cancel,
}

impl CellAction {
    fn from_released(buttons: MouseButtons) -> Self {
        match buttons {
            MouseButtons::LEFT => Self::Reveal,
            MouseButtons::RIGHT => Self::ToggleFlag,
            _ => Self::Cancel,
        }
    }
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    x: game::Coord,
    y: game::Coord,
    view: game::CellView,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<CellMsg>,
}

#[function_component(CellTile)]
fn cell_component(props: &CellProps) -> Html {
    use game::CellView::*;

    let CellProps {
        x,
        y,
        view,
        pressed,
        callback,
    } = props.clone();

    let (mut class, label) = match view {
        Hidden => (classes!("cell"), String::new()),
        Flagged => (classes!("cell", "flag"), "🚩".to_string()),
        Open(0) => (classes!("cell", "open"), String::new()),
        Open(count) => (
            classes!("cell", "open", format!("num-{}", count)),
            count.to_string(),
        ),
        Mine => (classes!("cell", "open", "mine"), "💣".to_string()),
    };
    if pressed {
        class.push("open");
    }

    let pointer_update = |name: &'static str| {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(CellMsg::Update(CellPointerState {
                pos: (x, y),
                buttons,
            }));
            log::trace!("({}, {}) mouse {} ({:?})", x, y, name, buttons);
        })
    };
    let onmousedown = pointer_update("down");
    let onmouseup = pointer_update("up");
    let onmouseenter = pointer_update("enter");

    let onmouseleave = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            callback.emit(CellMsg::Leave);
            log::trace!("({}, {}) mouse leave", x, y);
        })
    };

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}>{label}</td>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,
}

pub(crate) struct GameView {
    session: BrowserSession,
    prev_time: game::Millis,
    current_cell_state: Option<CellPointerState>,
    _timer_interval: Interval,
}

impl GameView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(500, move || link.send_message(Msg::UpdateTime))
    }

    fn displayed_seconds(&self) -> game::Millis {
        self.session.elapsed_millis() / 1000
    }

    fn is_playable(&self) -> bool {
        self.session
            .board()
            .is_some_and(|board| !board.is_finished())
    }

    fn get_game_state_class(&self) -> Classes {
        use game::BoardState::*;

        classes!(match self.session.board().map(|board| board.state()) {
            None => "not-started",
            Some(InProgress) if self.session.started_at().is_none() => "not-started",
            Some(InProgress) => "in-progress",
            Some(Won) => "win",
            Some(Lost) => "lose",
        })
    }

    fn is_pressed(&self, coords: game::Coord2, view: game::CellView) -> bool {
        self.is_playable()
            && view == game::CellView::Hidden
            && self
                .current_cell_state
                .is_some_and(|state| state.pos == coords && state.shows_pressed())
    }

    fn release(&mut self, pressed: CellPointerState) -> bool {
        let CellPointerState { pos, buttons } = pressed;
        let has_update = match CellAction::from_released(buttons) {
            CellAction::Reveal => {
                log::debug!("reveal cell: {:?}", pos);
                self.session.handle_reveal(pos).has_update()
            }
            CellAction::ToggleFlag => {
                log::debug!("flag cell: {:?}", pos);
                self.session.handle_flag_toggle(pos).has_update()
            }
            CellAction::Cancel => false,
        };
        has_update || pressed.shows_pressed()
    }

    fn view_grid(&self, ctx: &Context<Self>) -> Html {
        let Some(board) = self.session.board() else {
            return html! { <p class="idle">{"Pick a difficulty and press Start"}</p> };
        };
        let (cols, rows) = board.size();
        let is_playable = self.is_playable();

        html! {
            <table class={is_playable.then_some("playable")}>
                {
                    for (0..rows).map(|y| html! {
                        <tr>
                            {
                                for (0..cols).map(|x| {
                                    let pos = (x, y);
                                    let view = board
                                        .cell_at(pos)
                                        .map_or(game::CellView::Hidden, |cell| cell.view());
                                    let pressed = self.is_pressed(pos, view);
                                    let callback = ctx.link().callback(Msg::CellEvent);
                                    html! {
                                        <CellTile {x} {y} {view} {callback} {pressed}/>
                                    }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        log::debug!("seed: {}", seed);

        let mut session = BrowserSession::new(LocalRecordStore, AlertNotifier, BrowserClock, seed);
        session.set_config(LocalOrDefault::local_or_default());
        session.configure_difficulty(game::Difficulty::Custom);

        Self {
            session,
            prev_time: 0,
            current_cell_state: None,
            _timer_interval: GameView::create_timer(ctx),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use CellMsg::*;
        use Msg::*;

        match msg {
            CellEvent(Leave) => {
                log::trace!("cell leave");
                self.current_cell_state.take().is_some()
            }
            CellEvent(Update(cell_state)) if cell_state.buttons.is_empty() => {
                match self.current_cell_state.take() {
                    None => false,
                    Some(pressed) if pressed.pos == cell_state.pos => self.release(pressed),
                    Some(_) => true,
                }
            }
            CellEvent(Update(cell_state)) => {
                log::trace!("cell update: {:?}", cell_state);
                self.current_cell_state.replace(cell_state) != Some(cell_state)
            }
            UpdateTime => {
                let time = self.displayed_seconds();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            SelectDifficulty(difficulty) => {
                self.session.configure_difficulty(difficulty);
                self.session.config().local_save();
                true
            }
            EditConfig(config) => {
                self.session.set_config(config);
                config.local_save();
                true
            }
            RejectEdit(err) => {
                self.session.reject_config(err);
                true
            }
            StartGame => {
                self.current_cell_state = None;
                self.prev_time = 0;
                // a rejected board was already reported to the player
                if let Err(err) = self.session.start_game() {
                    log::debug!("start refused: {}", err);
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let difficulty = self
            .session
            .board()
            .map_or_else(|| self.session.difficulty(), |board| board.config().difficulty());
        let mines_left = self
            .session
            .board()
            .map_or(i32::from(self.session.config().mines), |board| board.mines_left());
        let game_state_class = self.get_game_state_class();

        let on_difficulty = ctx.link().callback(SelectDifficulty);
        let on_edit = ctx.link().callback(EditConfig);
        let on_reject = ctx.link().callback(RejectEdit);
        let on_start = ctx.link().callback(|()| StartGame);

        html! {
            <div class="sapper" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <SettingsView config={self.session.config()} {on_difficulty} {on_edit} {on_reject} {on_start}/>
                <nav class={game_state_class}>
                    <aside class="mines-left">{format_for_counter(mines_left)}</aside>
                    <span class="record">
                        {format!("{} · best {}", difficulty, game::format_record(self.session.shown_record()))}
                    </span>
                    <aside class="timer">{game::format_time(self.session.elapsed_millis())}</aside>
                </nav>
                {self.view_grid(ctx)}
            </div>
        }
    }
}
