//! Browser implementations of the collaborators a [`sapper_core::Session`] needs.

use gloo::{
    storage::{LocalStorage, Storage},
    timers::callback::Timeout,
};
use sapper_core::{Clock, Millis, Notice, Notifier, RecordStore};
use web_time::{SystemTime, UNIX_EPOCH};

/// Lets the final board render before a blocking `alert()` shows up.
const NOTICE_DELAY_MS: u32 = 100;

/// Best times kept as plain strings in `window.localStorage`.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalRecordStore;

impl RecordStore for LocalRecordStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).unwrap_or_else(|err| {
            log::error!("Could not read {} from local storage: {:?}", key, err);
            None
        })
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = LocalStorage::raw().set_item(key, value) {
            log::error!("Could not save {} to local storage: {:?}", key, err);
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&mut self, notice: Notice) {
        let message = notice.to_string();
        log::info!("{}", message);
        Timeout::new(NOTICE_DELAY_MS, move || gloo::dialogs::alert(&message)).forget();
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct BrowserClock;

impl Clock for BrowserClock {
    fn now_millis(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as Millis)
    }
}
