//! Browser front end: DOM presenter, `setTimeout` scheduler and input listeners.
//!
//! The page provides `#start`, `#controls`, note zones `#b1`..`#b4`, audio cues `#a1`..`#a4`
//! and `#crash`, the `#timeline` SVG with `#level` / `#levelMax` counters, and optionally a
//! `<select id="difficulty">`. One session lives in a thread-local; every listener and timer
//! re-borrows it, so all game mutation stays on the single JS thread.

use std::cell::RefCell;

use log::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlAudioElement, HtmlDocument, HtmlElement,
    HtmlSelectElement, KeyboardEvent, MouseEvent, window,
};

use crate::config::{Difficulty, GameConfig};
use crate::game::{Game, Phase};
#[cfg(feature = "serde_json")]
use crate::game::GameView;
use crate::input::{Command, InputMapper};
use crate::note::Note;
use crate::pattern::RandomNotes;
use crate::presenter::{Marker, Presenter, Round};
use crate::scheduler::{Scheduler, Wakeup};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

// --- Presenter ---------------------------------------------------------------

struct DomPresenter {
    body: HtmlElement,
    start: HtmlElement,
    controls: Element,
    level: Element,
    buttons: Vec<Element>,
    audio: Vec<HtmlAudioElement>,
    crash: Option<HtmlAudioElement>,
    circles: Vec<Element>,
    playing: Option<Note>,
}

impl DomPresenter {
    fn new(doc: &Document, levels: usize) -> Result<Self, JsValue> {
        let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let start: HtmlElement = by_id(doc, "start")?.dyn_into()?;
        let buttons = Note::ALL
            .iter()
            .map(|note| by_id(doc, &note.zone_id()))
            .collect::<Result<Vec<_>, _>>()?;
        let audio = Note::ALL
            .iter()
            .map(|note| {
                by_id(doc, &note.audio_id())?
                    .dyn_into::<HtmlAudioElement>()
                    .map_err(JsValue::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let crash = doc
            .get_element_by_id("crash")
            .and_then(|el| el.dyn_into().ok());
        Ok(Self {
            body,
            start,
            controls: by_id(doc, "controls")?,
            level: by_id(doc, "level")?,
            buttons,
            audio,
            crash,
            circles: build_timeline(doc, levels)?,
            playing: None,
        })
    }

    fn clear_highlights(&self) {
        for button in &self.buttons {
            button.class_list().remove_1("highlight").ok();
        }
    }

    fn show_idle(&self) {
        self.clear_highlights();
        self.body.set_class_name("");
        self.start.style().set_property("display", "").ok();
        self.controls.class_list().add_1("disabled").ok();
    }

    fn paint_markers(&self, round: Round) {
        for (i, circle) in self.circles.iter().enumerate() {
            paint_marker(circle, round.marker(i));
        }
    }
}

impl Presenter for DomPresenter {
    fn on_start(&mut self) {
        self.clear_highlights();
        self.start.style().set_property("display", "none").ok();
        self.controls.class_list().remove_1("disabled").ok();
        for circle in &self.circles {
            paint_marker(circle, Marker::NotDone);
        }
    }

    fn on_round_begin(&mut self, round: Round) {
        self.level.set_text_content(Some(&round.level.to_string()));
        self.paint_markers(round);
    }

    fn on_note_on(&mut self, note: Note) {
        if let Some(prev) = self.playing.take() {
            self.audio[prev.slot()].pause().ok();
        }
        self.buttons[note.slot()].class_list().add_1("highlight").ok();
        let audio = &self.audio[note.slot()];
        audio.load();
        // Autoplay may be refused until the first user gesture; the light still shows.
        if let Err(err) = audio.play() {
            warn!("audio {} did not play: {:?}", note, err);
        }
        self.playing = Some(note);
    }

    fn on_note_off(&mut self, note: Note) {
        self.buttons[note.slot()]
            .class_list()
            .remove_1("highlight")
            .ok();
    }

    fn on_fail(&mut self) {
        self.body.set_class_name("shake");
        if let Some(crash) = &self.crash {
            crash.play().ok();
        }
    }

    fn on_return_to_idle(&mut self) {
        self.show_idle();
    }
}

fn by_id(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

/// Horizontal position (percent) of marker `i` on a timeline of `levels` markers.
fn marker_x(i: usize, levels: usize) -> f64 {
    let gaps = levels.saturating_sub(1).max(1) as f64;
    90.0 / gaps * i as f64 + 5.0
}

fn build_timeline(doc: &Document, levels: usize) -> Result<Vec<Element>, JsValue> {
    let svg = by_id(doc, "timeline")?;
    svg.set_inner_html("");
    let mut circles = Vec::with_capacity(levels);
    for i in 0..levels {
        let circle = doc.create_element_ns(Some(SVG_NS), "circle")?;
        circle.set_attribute("cx", &format!("{}%", marker_x(i, levels)))?;
        circle.set_attribute("cy", "10")?;
        paint_marker(&circle, Marker::NotDone);
        svg.append_child(&circle)?;
        circles.push(circle);
    }
    by_id(doc, "levelMax")?.set_text_content(Some(&levels.to_string()));
    Ok(circles)
}

fn paint_marker(circle: &Element, marker: Marker) {
    circle.set_attribute("class", marker.class()).ok();
    circle
        .set_attribute("r", &marker.radius().to_string())
        .ok();
}

// --- Scheduler ---------------------------------------------------------------

struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn after(&mut self, delay_ms: u32, wakeup: Wakeup) {
        let Some(win) = window() else {
            error!("no window, dropping {:?}", wakeup.timer);
            return;
        };
        let callback = Closure::once_into_js(move || {
            with_session(|session| session.game.fire(wakeup));
        });
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handler: &js_sys::Function = callback.unchecked_ref();
        if let Err(err) =
            win.set_timeout_with_callback_and_timeout_and_arguments_0(handler, timeout)
        {
            error!("setTimeout failed: {:?}", err);
        }
    }
}

// --- Session -----------------------------------------------------------------

struct Session {
    game: Game<BrowserScheduler, DomPresenter>,
    input: InputMapper,
}

impl Session {
    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Start => self.game.start_game(),
            Command::Press(note) => self.game.note_press(note),
            Command::Release(note) => self.game.note_release(note),
        }
    }
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    SESSION.with(|cell| {
        let mut slot = match cell.try_borrow_mut() {
            Ok(slot) => slot,
            Err(err) => {
                error!("session busy, event dropped: {err}");
                return None;
            }
        };
        slot.as_mut().map(f)
    })
}

/// Builds the session from the page and wires up input. Calling it again is a no-op; a
/// difficulty change reloads the page instead.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    if SESSION.with(|cell| cell.borrow().is_some()) {
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let cookie = doc
        .dyn_ref::<HtmlDocument>()
        .and_then(|html| html.cookie().ok())
        .unwrap_or_default();
    let difficulty = Difficulty::from_cookie(&cookie);
    let config = GameConfig::new(difficulty);

    let presenter = DomPresenter::new(&doc, config.levels())?;
    presenter.show_idle();
    let notes = RandomNotes::from_entropy()?;
    let game = Game::new(config, BrowserScheduler, presenter, notes);
    SESSION.with(|cell| {
        cell.replace(Some(Session {
            game,
            input: InputMapper::new(),
        }))
    });

    bind_keyboard(&doc)?;
    bind_pointer(&doc)?;
    listen(&win, "blur", |_: Event| {
        with_session(|session| {
            for command in session.input.blur() {
                session.dispatch(command);
            }
        });
    })?;
    let start = by_id(&doc, "start")?;
    listen(&start, "click", |_: MouseEvent| {
        with_session(|session| session.game.start_game());
    })?;
    bind_difficulty(&doc, difficulty)?;

    info!("mounted, difficulty {:?} ({} levels)", difficulty, difficulty.levels());
    Ok(())
}

pub(crate) fn start_game() -> Result<(), JsValue> {
    with_session(|session| session.game.start_game())
        .ok_or_else(|| JsValue::from_str("game not mounted"))
}

pub(crate) fn teardown() {
    with_session(|session| session.game.teardown());
}

#[cfg(feature = "serde_json")]
pub(crate) fn view() -> Option<GameView> {
    with_session(|session| session.game.view())
}

// --- Listeners -----------------------------------------------------------------

fn listen<E>(
    target: &EventTarget,
    kind: &str,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(move |evt: E| handler(evt)) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_keyboard(doc: &Document) -> Result<(), JsValue> {
    listen(doc, "keydown", |evt: KeyboardEvent| {
        let key = evt.key();
        if Note::from_key(&key).is_none() {
            return;
        }
        evt.prevent_default();
        with_session(|session| {
            if let Some(command) = session.input.key_down(&key, evt.repeat()) {
                session.dispatch(command);
            }
        });
    })?;
    listen(doc, "keyup", |evt: KeyboardEvent| {
        let key = evt.key();
        if Note::from_key(&key).is_none() {
            return;
        }
        evt.prevent_default();
        with_session(|session| {
            if let Some(command) = session.input.key_up(&key) {
                session.dispatch(command);
            }
        });
    })?;
    listen(doc, "keypress", |evt: KeyboardEvent| {
        with_session(|session| {
            let idle = session.game.phase() == Phase::Idle;
            if let Some(command) = session.input.key_press(&evt.key(), idle) {
                evt.prevent_default();
                session.dispatch(command);
            }
        });
    })
}

fn bind_pointer(doc: &Document) -> Result<(), JsValue> {
    type PointerHandler = fn(&mut InputMapper, &str) -> crate::Result<Option<Command>>;
    let handlers: [(&str, PointerHandler); 3] = [
        ("mousedown", InputMapper::pointer_down),
        ("mouseup", InputMapper::pointer_up),
        ("mouseout", InputMapper::pointer_out),
    ];
    for note in Note::ALL {
        let button = by_id(doc, &note.zone_id())?;
        for (kind, handler) in handlers {
            let zone = note.zone_id();
            listen(&button, kind, move |_: MouseEvent| {
                with_session(|session| match handler(&mut session.input, &zone) {
                    Ok(Some(command)) => session.dispatch(command),
                    Ok(None) => {}
                    Err(err) => warn!("{err}"),
                });
            })?;
        }
    }
    Ok(())
}

fn bind_difficulty(doc: &Document, current: Difficulty) -> Result<(), JsValue> {
    let Some(select) = doc
        .get_element_by_id("difficulty")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
    else {
        return Ok(());
    };
    select.set_selected_index(i32::from(current.index()));
    let chosen = select.clone();
    listen(&select, "change", move |_: Event| {
        let picked = u8::try_from(chosen.selected_index())
            .map_err(|_| crate::Error::InvalidDifficulty(chosen.selected_index().to_string()))
            .and_then(Difficulty::from_index);
        match picked {
            Ok(difficulty) => persist_difficulty(difficulty),
            Err(err) => warn!("{err}"),
        }
    })
}

/// Stores the preference and reloads, so the new target length starts a fresh session.
fn persist_difficulty(difficulty: Difficulty) {
    let Some(win) = window() else {
        return;
    };
    let Some(html) = win
        .document()
        .and_then(|doc| doc.dyn_into::<HtmlDocument>().ok())
    else {
        return;
    };
    if let Err(err) = html.set_cookie(&difficulty.to_cookie()) {
        warn!("could not store difficulty: {:?}", err);
        return;
    }
    info!("difficulty now {:?}, reloading", difficulty);
    win.location().reload().ok();
}
