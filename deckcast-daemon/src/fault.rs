//! Process-level fault reporting.
//!
//! Panics are logged and raised as alerts from the panic hook. Tasks that
//! panic are restarted by their owner; the hook only makes the fault
//! visible.

use deckcast_core::events::AlertHandle;

/// Install a panic hook that raises an alert, then runs the previous hook.
pub fn install_panic_alert(alerts: AlertHandle) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic_message(info.payload());

        tracing::error!(%location, %message, "Uncaught fault");
        alerts.notify(
            format!("Uncaught fault: {message}"),
            Some(format!("at {location}")),
        );

        previous(info);
    }));
}

/// Extract the message of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
