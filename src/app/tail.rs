use crate::app::{AppModel, DocumentSession};
use std::time::{Duration, Instant};

/// The one recurring tail timer. Holding it in a single `Option` makes timer
/// exclusivity structural: rebinding or clearing it replaces the previous
/// timer in the same step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TailBinding {
    pub generation: u64,
    pub path: String,
    pub next_due: Instant,
}

/// Reconciles the timer against the current model. Called after every
/// transition, so cancellation is synchronous with the change of
/// `path`/`mode`: a log session owns exactly one binding tagged with its
/// generation, anything else owns none.
pub fn reconcile_tail(
    binding: Option<TailBinding>,
    model: &AppModel,
    interval: Duration,
    now: Instant,
) -> Option<TailBinding> {
    let Some(DocumentSession::Log { path, .. }) = &model.session else {
        return None;
    };

    match binding {
        Some(binding) if binding.generation == model.generation => Some(binding),
        _ => Some(TailBinding {
            generation: model.generation,
            path: path.clone(),
            next_due: now + interval,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppEvent, apply_log_open, update};
    use crate::domain::LogChunk;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const INTERVAL: Duration = Duration::from_secs(2);

    fn chunk(content: &str) -> LogChunk {
        LogChunk {
            content: content.to_string(),
            offset: 0,
            next_offset: content.len() as u64,
            size: content.len() as u64,
            eof: true,
        }
    }

    fn log_model(path: &str) -> AppModel {
        let base = AppModel::new("http://127.0.0.1:8000".to_string()).switch_mode();
        apply_log_open(&base, path.to_string(), Ok(chunk("boot")))
    }

    #[test]
    fn binds_one_timer_to_the_open_log_session() {
        let model = log_model("a.log");
        let now = Instant::now();
        let binding = reconcile_tail(None, &model, INTERVAL, now).expect("binding");
        assert_eq!(binding.path, "a.log");
        assert_eq!(binding.generation, model.generation);
        assert_eq!(binding.next_due, now + INTERVAL);
    }

    #[test]
    fn keeps_the_binding_while_the_session_is_unchanged() {
        let model = log_model("a.log");
        let now = Instant::now();
        let first = reconcile_tail(None, &model, INTERVAL, now);
        let second = reconcile_tail(first.clone(), &model, INTERVAL, now + INTERVAL);
        assert_eq!(first, second);
    }

    #[test]
    fn switching_files_rebinds_exactly_one_timer() {
        let first_model = log_model("a.log");
        let now = Instant::now();
        let first = reconcile_tail(None, &first_model, INTERVAL, now);

        let second_model =
            apply_log_open(&first_model, "b.log".to_string(), Ok(chunk("start")));
        let second =
            reconcile_tail(first, &second_model, INTERVAL, now).expect("binding");
        assert_eq!(second.path, "b.log");
        assert_eq!(second.generation, second_model.generation);
    }

    #[test]
    fn mode_switch_clears_the_timer() {
        let model = log_model("a.log");
        let now = Instant::now();
        let binding = reconcile_tail(None, &model, INTERVAL, now);

        let (switched, _) = update(
            model,
            AppEvent::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
        );
        assert_eq!(reconcile_tail(binding, &switched, INTERVAL, now), None);
    }

    #[test]
    fn markdown_sessions_never_hold_a_timer() {
        let model = AppModel::new("s".to_string());
        assert_eq!(reconcile_tail(None, &model, INTERVAL, Instant::now()), None);
    }
}
