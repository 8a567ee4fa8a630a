pub mod game;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;
use log::{debug, warn};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::Function;

pub use game::{
    Board, Card, CardGenerator, CardView, CellStatus, Color, Count, Difficulty, GameConfig,
    GameError, GameEvent, IntegrityError, RoundCommand, RoundController, RoundRequest,
    RoundSettings, RoundSnapshot, RoundStatus, SetOutcome, SetRule, Shape, Style, TimerEngine,
    TimerSignal, View,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

fn to_js_error(error: GameError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

struct Session {
    controller: RoundController,
    listener: Option<Function>,
    ticker: Option<Interval>,
}

/// 浏览器端的对局会话：接收页面事件，驱动计时器，并把事件推给监听函数。
#[wasm_bindgen]
pub struct SetGame {
    session: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
impl SetGame {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SetGame, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        let session = Session {
            controller: RoundController::new(config),
            listener: None,
            ticker: None,
        };
        Ok(SetGame {
            session: Rc::new(RefCell::new(session)),
        })
    }

    #[wasm_bindgen(js_name = "setListener")]
    pub fn set_listener(&self, listener: Function) {
        self.session.borrow_mut().listener = Some(listener);
    }

    pub fn start(&self, request: JsValue) -> Result<(), JsValue> {
        let request: RoundRequest = from_value(request).map_err(JsValue::from)?;
        dispatch(&self.session, RoundCommand::StartRequested { request })
    }

    #[wasm_bindgen(js_name = "clickCard")]
    pub fn click_card(&self, card_id: String) -> Result<(), JsValue> {
        dispatch(&self.session, RoundCommand::CardClicked { card_id })
    }

    pub fn refresh(&self) -> Result<(), JsValue> {
        dispatch(&self.session, RoundCommand::RefreshRequested)
    }

    pub fn back(&self) -> Result<(), JsValue> {
        dispatch(&self.session, RoundCommand::BackRequested)
    }

    /// 直接投递一条序列化的 `RoundCommand`。
    pub fn dispatch(&self, command: JsValue) -> Result<(), JsValue> {
        let command: RoundCommand = from_value(command).map_err(JsValue::from)?;
        dispatch(&self.session, command)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.borrow().controller.snapshot()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "stateJson")]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.borrow().controller.snapshot())
            .map_err(serde_to_js_error)
    }
}

fn dispatch(session: &Rc<RefCell<Session>>, command: RoundCommand) -> Result<(), JsValue> {
    let (events, listener) = {
        let mut inner = session.borrow_mut();
        let events = inner.controller.handle(command).map_err(to_js_error)?;
        (events, inner.listener.clone())
    };

    for event in &events {
        schedule(session, event);
    }

    if let Some(listener) = listener {
        for event in &events {
            let payload = to_value(event).map_err(JsValue::from)?;
            listener.call1(&JsValue::NULL, &payload)?;
        }
    }
    Ok(())
}

fn dispatch_later(session: &Weak<RefCell<Session>>, command: RoundCommand) {
    let Some(session) = session.upgrade() else {
        debug!("session dropped before {command:?} fired");
        return;
    };
    if let Err(error) = dispatch(&session, command) {
        warn!("deferred command failed: {error:?}");
    }
}

fn schedule(session: &Rc<RefCell<Session>>, event: &GameEvent) {
    match event {
        GameEvent::RoundStarted { .. } => {
            let interval_ms = session.borrow().controller.config().tick_interval_ms;
            let weak = Rc::downgrade(session);
            let ticker = Interval::new(interval_ms, move || {
                dispatch_later(&weak, RoundCommand::Tick);
            });
            let previous = session.borrow_mut().ticker.replace(ticker);
            release_ticker(previous);
        }
        GameEvent::RoundEnded { .. } => {
            let previous = session.borrow_mut().ticker.take();
            release_ticker(previous);
        }
        GameEvent::ResolutionScheduled {
            resolution_id,
            delay_ms,
        } => {
            let weak = Rc::downgrade(session);
            let command = RoundCommand::ResolutionDue {
                resolution_id: *resolution_id,
            };
            let delay_ms = *delay_ms;
            spawn_local(async move {
                TimeoutFuture::new(delay_ms).await;
                dispatch_later(&weak, command);
            });
        }
        _ => {}
    }
}

/// 计时器可能正是在自己的回调里被结束的，所以把释放推迟到当前回调返回之后。
fn release_ticker(ticker: Option<Interval>) {
    if let Some(ticker) = ticker {
        spawn_local(async move {
            drop(ticker);
        });
    }
}

#[wasm_bindgen(js_name = "formatClock")]
pub fn format_clock(seconds: u32) -> String {
    game::format_clock(seconds)
}

/// 按页面规则判断三张牌是否成组。
#[wasm_bindgen(js_name = "isSet")]
pub fn is_set(cards: JsValue, difficulty: String) -> Result<bool, JsValue> {
    let cards: Vec<Card> = from_value(cards).map_err(JsValue::from)?;
    let cards: [Card; 3] = cards
        .try_into()
        .map_err(|_| JsValue::from_str("isSet expects exactly three cards"))?;
    let difficulty = difficulty.parse::<Difficulty>().map_err(|_| {
        to_js_error(GameError::ConfigurationInvalid {
            field: "difficulty".to_string(),
            value: difficulty.clone(),
        })
    })?;
    Ok(game::validate(SetRule::AnyMatch, &cards, difficulty))
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
