use sapper_core::{BoardConfig, Difficulty, GameError};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Editable field of the board configuration form.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum ConfigField {
    Width,
    Height,
    Mines,
}

impl ConfigField {
    const fn label(self) -> &'static str {
        match self {
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Mines => "Mines",
        }
    }

    fn value(self, config: BoardConfig) -> String {
        match self {
            Self::Width => config.width.to_string(),
            Self::Height => config.height.to_string(),
            Self::Mines => config.mines.to_string(),
        }
    }

    /// Applies the raw input text. Values the board can't hold are rejected, never truncated.
    pub(crate) fn apply(self, config: BoardConfig, raw: &str) -> Result<BoardConfig, GameError> {
        let value: u32 = raw.trim().parse().map_err(|_| GameError::NotANumber)?;
        let mut config = config;
        match self {
            Self::Width => config.width = value.try_into().map_err(|_| GameError::BoardTooLarge)?,
            Self::Height => config.height = value.try_into().map_err(|_| GameError::BoardTooLarge)?,
            Self::Mines => config.mines = value.try_into().map_err(|_| GameError::TooManyMines)?,
        }
        Ok(config)
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct SettingsProps {
    pub config: BoardConfig,
    pub on_difficulty: Callback<Difficulty>,
    pub on_edit: Callback<BoardConfig>,
    pub on_reject: Callback<GameError>,
    pub on_start: Callback<()>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let SettingsProps {
        config,
        on_difficulty,
        on_edit,
        on_reject,
        on_start,
    } = props;
    let config = *config;
    let selected = config.difficulty();

    let tiers = Difficulty::TIERS.into_iter().map(|tier| {
        let on_difficulty = on_difficulty.clone();
        let class = classes!((tier == selected).then_some("selected"));
        html! {
            <button type="button" {class} onclick={move |_| on_difficulty.emit(tier)}>{tier.name()}</button>
        }
    });

    let fields = [ConfigField::Width, ConfigField::Height, ConfigField::Mines]
        .into_iter()
        .map(|field| {
            let on_edit = on_edit.clone();
            let on_reject = on_reject.clone();
            let onchange = Callback::from(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                match field.apply(config, &input.value()) {
                    Ok(edited) => on_edit.emit(edited),
                    Err(err) => {
                        log::debug!("{:?} input {:?} rejected", field, input.value());
                        // the vdom value didn't change, so reset the element by hand
                        input.set_value(&field.value(config));
                        on_reject.emit(err);
                    }
                }
            });
            html! {
                <label>
                    {field.label()}
                    <input type="number" min="0" value={field.value(config)} {onchange}/>
                </label>
            }
        });

    let on_start = on_start.clone();
    html! {
        <form class="settings" onsubmit={Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_start.emit(());
        })}>
            <fieldset class="tiers">{ for tiers }</fieldset>
            <fieldset class="fields">{ for fields }</fieldset>
            <button type="submit">{"Start"}</button>
        </form>
    }
}
