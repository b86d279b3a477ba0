//! JavaScript bindings (WASM only)
//!
//! The page's script owns rendering and DOM events. It calls into
//! `WebTracker` for every user intent and re-renders from the JSON snapshot.
//! Rejected operations throw a JS `Error` whose message can be shown as-is.

use wasm_bindgen::prelude::*;

use crate::error::TrackerError;
use crate::history::YearMonth;
use crate::persistence::LocalStorage;
use crate::settings::Settings;
use crate::tracker::Tracker;

/// Install the panic hook and route `log` to the browser console
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn reject(err: TrackerError) -> JsValue {
    js_error(&err.to_string())
}

/// Tracker backed by the page's LocalStorage
#[wasm_bindgen]
pub struct WebTracker {
    inner: Tracker,
}

#[wasm_bindgen]
impl WebTracker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebTracker, JsValue> {
        let store = LocalStorage::open().map_err(|e| js_error(&e.to_string()))?;
        log::info!("Challenge Coin starting...");
        Ok(WebTracker {
            inner: Tracker::load(Box::new(store)),
        })
    }

    /// Current view model as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot()).map_err(|e| js_error(&e.to_string()))
    }

    #[wasm_bindgen(js_name = addAccount)]
    pub fn add_account(&mut self) -> Result<usize, JsValue> {
        self.inner.add_account().map_err(reject)
    }

    #[wasm_bindgen(js_name = deleteAccount)]
    pub fn delete_account(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.delete_account(index).map(|_| ()).map_err(reject)
    }

    #[wasm_bindgen(js_name = renameAccount)]
    pub fn rename_account(&mut self, index: usize, name: &str) -> Result<(), JsValue> {
        self.inner.rename_account(index, name).map_err(reject)
    }

    #[wasm_bindgen(js_name = setAccountColor)]
    pub fn set_account_color(&mut self, index: usize, color: &str) -> Result<(), JsValue> {
        self.inner.set_account_color(index, color).map_err(reject)
    }

    #[wasm_bindgen(js_name = resetAccount)]
    pub fn reset_account(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.reset_account(index).map_err(reject)
    }

    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&mut self) {
        self.inner.reset_all();
    }

    #[wasm_bindgen(js_name = addChallenge)]
    pub fn add_challenge(&mut self) -> Result<usize, JsValue> {
        self.inner.add_challenge().map_err(reject)
    }

    #[wasm_bindgen(js_name = deleteChallenge)]
    pub fn delete_challenge(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.delete_challenge(index).map(|_| ()).map_err(reject)
    }

    /// `value` comes straight from a number input and may be NaN
    #[wasm_bindgen(js_name = updateChallenge)]
    pub fn update_challenge(&mut self, index: usize, name: &str, value: f64) -> Result<(), JsValue> {
        let value = value.is_finite().then(|| value.trunc() as i64);
        self.inner.update_challenge(index, name, value).map_err(reject)
    }

    #[wasm_bindgen(js_name = openAccount)]
    pub fn open_account(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.open_account(index).map_err(reject)
    }

    #[wasm_bindgen(js_name = selectChallenge)]
    pub fn select_challenge(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.select_challenge(index).map_err(reject)
    }

    #[wasm_bindgen(js_name = backToList)]
    pub fn back_to_list(&mut self) {
        self.inner.back_to_list();
    }

    /// Pass no month to show every entry
    #[wasm_bindgen(js_name = setMonthFilter)]
    pub fn set_month_filter(&mut self, year: Option<i32>, month: Option<u32>) {
        let filter = year.zip(month).and_then(|(y, m)| YearMonth::new(y, m));
        self.inner.set_month_filter(filter);
    }

    /// New balance, or undefined when nothing changed
    #[wasm_bindgen(js_name = addCoin)]
    pub fn add_coin(&mut self) -> Option<f64> {
        self.inner.add_coin().map(|c| c as f64)
    }

    #[wasm_bindgen(js_name = removeCoin)]
    pub fn remove_coin(&mut self) -> Option<f64> {
        self.inner.remove_coin().map(|c| c as f64)
    }

    /// Reward for the confirmation dialog
    #[wasm_bindgen(js_name = previewExchange)]
    pub fn preview_exchange(&self, input: &str) -> Result<f64, JsValue> {
        let amount = crate::model::parse_exchange_amount(input).map_err(reject)?;
        self.inner
            .preview_exchange(amount)
            .map(|r| r as f64)
            .map_err(reject)
    }

    /// Exchange receipt as JSON
    pub fn exchange(&mut self, input: &str) -> Result<String, JsValue> {
        let receipt = self.inner.exchange_input(input).map_err(reject)?;
        serde_json::to_string(&receipt).map_err(|e| js_error(&e.to_string()))
    }

    /// Current settings as JSON
    pub fn settings(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.settings()).map_err(|e| js_error(&e.to_string()))
    }

    /// Replace the settings from JSON; omitted fields take their defaults
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| js_error(&e.to_string()))?;
        self.inner.update_settings(settings);
        Ok(())
    }

    /// "1200¥"-style reward text
    #[wasm_bindgen(js_name = formatReward)]
    pub fn format_reward(&self, reward: f64) -> String {
        self.inner.settings().format_reward(reward.max(0.0) as u64)
    }

    /// How long the celebration overlay should stay up (ms)
    #[wasm_bindgen(js_name = celebrationMs)]
    pub fn celebration_ms(&self) -> u32 {
        self.inner.settings().celebration_ms
    }
}
