//! "Pick one of N" with the previous pick offered as the default.
//!
//! The chosen id is persisted under `<group>/<label>_id`, so a later run
//! pre-fills the same entry even if the list order changed.

use crate::config::ConfigCache;
use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Anything that can be listed by name and remembered by id.
pub trait Selectable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Selectable for super::taxonomy::Client {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Selectable for super::taxonomy::Project {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Selectable for super::taxonomy::Task {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct Selection<'a, T> {
    pub id: String,
    pub item: &'a T,
}

/// Persistence slot for a label, e.g. "Project" -> "project_id".
pub fn slot_key(label: &str) -> String {
    format!("{}_id", label.to_lowercase())
}

/// 1-based position of `previous` in `items`, or 1 when it is gone.
pub fn default_position<T: Selectable>(items: &[T], previous: Option<&str>) -> usize {
    previous
        .and_then(|id| items.iter().position(|item| item.id() == id))
        .map_or(1, |idx| idx + 1)
}

pub fn select<'a, T: Selectable>(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    group: &str,
    label: &str,
    items: &'a [T],
) -> Result<Selection<'a, T>> {
    let key = slot_key(label);

    let item = if let [only] = items {
        prompter.show(&format!("{}: {}", label, only.name()), None);
        only
    } else {
        let previous = cache.get(group, &key)?;
        let default = default_position(items, previous.as_deref());

        prompter.show(&format!("{}s", label), None);
        for (idx, item) in items.iter().enumerate() {
            prompter.line(&format!("{:2}) {}", idx + 1, item.name()));
        }

        let hint = items.get(default - 1).map(|item| item.name());
        let answer = prompter.ask(
            &format!("Select {}", label.to_lowercase()),
            Some(&default.to_string()),
            hint,
        )?;
        resolve(items, label, &answer)?
    };

    let id = item.id().to_string();
    cache.set(group, &key, &id)?;
    log::debug!("Selected {} {} ({})", label.to_lowercase(), id, item.name());

    Ok(Selection { id, item })
}

fn resolve<'a, T>(items: &'a [T], label: &str, answer: &str) -> Result<&'a T> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|pos| pos.checked_sub(1))
        .and_then(|idx| items.get(idx))
        .ok_or_else(|| Error::Selection {
            label: label.to_lowercase(),
            position: answer.trim().to_string(),
            len: items.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::secret::test_key;
    use crate::core::taxonomy::Task;
    use crate::prompt::testing::ScriptedPrompter;

    fn tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter()
            .map(|id| Task {
                id: id.to_string(),
                name: format!("Task {}", id),
            })
            .collect()
    }

    fn cache(dir: &tempfile::TempDir) -> ConfigCache {
        ConfigCache::open(dir.path().join("config.json"), test_key())
    }

    #[test]
    fn single_item_never_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        let mut prompter = ScriptedPrompter::default();
        let items = tasks(&["7"]);

        for _ in 0..3 {
            let sel = select(&mut cache, &mut prompter, "tickspot", "Task", &items).unwrap();
            assert_eq!(sel.id, "7");
            assert_eq!(sel.item.name, "Task 7");
        }
        assert!(prompter.asked.is_empty());
        assert_eq!(prompter.shown, vec!["Task: Task 7"; 3]);
        assert_eq!(cache.get("tickspot", "task_id").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn previous_pick_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        cache.set("tickspot", "task_id", "3").unwrap();
        let mut prompter = ScriptedPrompter::new([""]);
        let items = tasks(&["1", "2", "3"]);

        let sel = select(&mut cache, &mut prompter, "tickspot", "Task", &items).unwrap();
        assert_eq!(sel.id, "3");
        assert_eq!(prompter.asked[0], ("Select task".to_string(), Some("3".to_string())));
    }

    #[test]
    fn stale_pick_falls_back_to_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        cache.set("tickspot", "task_id", "99").unwrap();
        let mut prompter = ScriptedPrompter::new([""]);
        let items = tasks(&["1", "2"]);

        let sel = select(&mut cache, &mut prompter, "tickspot", "Task", &items).unwrap();
        assert_eq!(sel.id, "1");
        assert_eq!(prompter.asked[0].1.as_deref(), Some("1"));
        assert_eq!(cache.get("tickspot", "task_id").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn typed_position_is_persisted_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        let mut prompter = ScriptedPrompter::new(["2"]);
        let items = tasks(&["a", "b", "c"]);

        let sel = select(&mut cache, &mut prompter, "rubytime", "Project", &items).unwrap();
        assert_eq!(sel.id, "b");
        assert_eq!(cache.get("rubytime", "project_id").unwrap().as_deref(), Some("b"));
        assert_eq!(prompter.shown, ["Projects", " 1) Task a", " 2) Task b", " 3) Task c"]);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        let items = tasks(&["a", "b"]);

        for answer in ["5", "0", "two"] {
            let mut prompter = ScriptedPrompter::new([answer]);
            let err = select(&mut cache, &mut prompter, "tickspot", "Client", &items).unwrap_err();
            assert!(matches!(err, Error::Selection { len: 2, .. }), "{}", answer);
        }
        assert_eq!(cache.get("tickspot", "client_id").unwrap(), None);
    }

    #[test]
    fn empty_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(&dir);
        let mut prompter = ScriptedPrompter::new([""]);
        let items: Vec<Task> = Vec::new();

        let err = select(&mut cache, &mut prompter, "tickspot", "Task", &items).unwrap_err();
        assert!(matches!(err, Error::Selection { len: 0, .. }));
    }

    #[test]
    fn default_position_lookup() {
        let items = tasks(&["x", "y"]);
        assert_eq!(default_position(&items, Some("y")), 2);
        assert_eq!(default_position(&items, Some("gone")), 1);
        assert_eq!(default_position(&items, None), 1);
    }
}
