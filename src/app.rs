use std::path::Path;

use chrono::NaiveDate;

use crate::config::{Ask, ConfigCache, EDITOR, default_editor};
use crate::core::secret::derive_key;
use crate::core::work_time;
use crate::error::Result;
use crate::note;
use crate::prompt::Prompter;
use crate::sync::{DailyEntry, submit_all};

/// Unlock the config with the master password.
pub fn unlock(prompter: &mut dyn Prompter, config_path: &Path) -> Result<ConfigCache> {
    let password = prompter.ask_secret("Please enter password to unlock config:")?;
    let key = derive_key(&password)?;
    let cache = ConfigCache::open(config_path, key);
    crate::set_debug_logging(cache.debug_logging());
    log::info!("Config loaded from {}", cache.path().display());
    Ok(cache)
}

/// Let the user edit the note for `day` and confirm the hours worked.
pub fn compose_entry(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    day: NaiveDate,
    today: NaiveDate,
) -> Result<DailyEntry> {
    let editor = cache.get_or_prompt(
        EDITOR,
        "command",
        prompter,
        Ask::WithDefault("Type your editor command", &default_editor()),
    )?;

    let note = note::edit(&note::seed(day)?, &editor)?;
    prompter.show("Your message:", Some(&note));

    let suggested = work_time::suggest(day == today).to_string();
    prompter.show(&format!("Calculated work time: {}", suggested), None);
    let hours = prompter.ask("Input work time", Some(&suggested), None)?;
    prompter.show(&format!("Work time: {}", hours), None);

    Ok(DailyEntry {
        date: day,
        hours,
        note,
    })
}

pub async fn run(prompter: &mut dyn Prompter, config_path: &Path, day: NaiveDate, today: NaiveDate) -> Result<()> {
    let mut cache = unlock(prompter, config_path)?;
    let entry = compose_entry(&mut cache, prompter, day, today)?;
    submit_all(&mut cache, prompter, &entry).await
}
