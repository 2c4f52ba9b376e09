// Small helpers shared by components: formatting, timers, liveness.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Countdown text: `1:02:03`, `02:03` or `3s`.
pub fn format_countdown(ms: f64) -> String {
    let secs = (ms.max(0.0) / 1000.0).ceil() as u64;
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{:01}:{:02}:{:02}", h, m, s)
    } else if m > 0 {
        format!("{:02}:{:02}", m, s)
    } else {
        format!("{}s", s)
    }
}

/// `1234567` -> `1,234,567`.
pub fn format_points(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `2024-03-05T10:00:00Z` -> `2024-03-05`; anything else is shown as sent.
pub fn format_join_date(raw: &str) -> String {
    match raw.get(..10) {
        Some(day) if day.as_bytes().get(4) == Some(&b'-') => day.to_string(),
        _ => raw.to_string(),
    }
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Timeout delay that lands just after `at_ms`. Far-off instants clamp to
/// the largest delay the browser timer accepts.
pub fn delay_until(at_ms: f64, now_ms: f64) -> i32 {
    let delay = (at_ms - now_ms).max(0.0) as i32;
    delay.saturating_add(1)
}

/// Set to false by an effect's cleanup so late async results are dropped
/// instead of touching state of an unmounted view.
#[derive(Clone, Debug)]
pub struct AliveFlag(Rc<Cell<bool>>);

impl AliveFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn kill(&self) {
        self.0.set(false);
    }
}

impl Default for AliveFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// `setTimeout`/`setInterval` handle; clears itself on drop.
pub struct Timer {
    id: i32,
    repeating: bool,
    _closure: Closure<dyn FnMut()>,
}

impl Timer {
    pub fn timeout(ms: i32, f: impl FnMut() + 'static) -> Option<Self> {
        Self::start(ms, false, f)
    }

    pub fn interval(ms: i32, f: impl FnMut() + 'static) -> Option<Self> {
        Self::start(ms, true, f)
    }

    fn start(ms: i32, repeating: bool, f: impl FnMut() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let cb = closure.as_ref().unchecked_ref();
        let id = if repeating {
            window.set_interval_with_callback_and_timeout_and_arguments_0(cb, ms)
        } else {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(cb, ms)
        }
        .ok()?;
        Some(Self {
            id,
            repeating,
            _closure: closure,
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            if self.repeating {
                window.clear_interval_with_handle(self.id);
            } else {
                window.clear_timeout_with_handle(self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_until_clamps_both_ends() {
        assert_eq!(delay_until(1_000.0, 5_000.0), 1);
        assert_eq!(delay_until(5_000.0, 1_000.0), 4_001);
        let thirty_days = 30.0 * 24.0 * 60.0 * 60.0 * 1_000.0;
        assert_eq!(delay_until(thirty_days, 0.0), i32::MAX);
    }

    #[test]
    fn countdown_formats() {
        assert_eq!(format_countdown(0.0), "0s");
        assert_eq!(format_countdown(7_200.0), "8s");
        assert_eq!(format_countdown(65_000.0), "01:05");
        assert_eq!(format_countdown(86_400_000.0), "24:00:00");
        assert_eq!(format_countdown(-5.0), "0s");
    }

    #[test]
    fn points_get_thousands_separators() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(540), "540");
        assert_eq!(format_points(1_000), "1,000");
        assert_eq!(format_points(1_234_567), "1,234,567");
    }

    #[test]
    fn join_date_keeps_day_part() {
        assert_eq!(format_join_date("2024-03-05T10:00:00Z"), "2024-03-05");
        assert_eq!(format_join_date("yesterday"), "yesterday");
    }

    #[test]
    fn alive_flag_is_shared_between_clones() {
        let a = AliveFlag::new();
        let b = a.clone();
        b.kill();
        assert!(!a.is_alive());
    }
}
