//! Share-link fragment in the address bar.

use log::warn;
use wasm_bindgen::JsValue;
use web_sys::Window;

/// The current URL fragment, `#` included; `None` when there is none.
pub(crate) fn read_fragment(window: &Window) -> Option<String> {
    let href = window.location().href().ok()?;
    let (_, fragment) = href.rsplit_once('#')?;
    (!fragment.is_empty()).then(|| format!("#{fragment}"))
}

/// Replace the URL fragment without adding a history entry.
pub(crate) fn write_fragment(window: &Window, fragment: &str) {
    let history = match window.history() {
        Ok(history) => history,
        Err(e) => {
            warn!("Cannot update share link, no history: {e:?}");
            return;
        }
    };
    if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(fragment)) {
        warn!("Cannot update share link: {e:?}");
    }
}
