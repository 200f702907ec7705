pub mod html_form;
pub mod rubytime;
pub mod tickspot;

#[cfg(test)]
mod test_server;

use std::fmt;

use chrono::NaiveDate;
use reqwest::Response;

use crate::config::{Ask, ConfigCache, RUBYTIME, TICKSPOT};
use crate::core::day::wire_format;
use crate::core::selector::select;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use rubytime::{FormSession, RubyTimeClient};
use tickspot::TickSpotClient;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Pass 2xx responses through; anything else becomes `Error::Remote`.
pub(crate) async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    log::warn!("{} returned {}", resp.url(), status);
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("Could not read error body: {}", e);
            String::new()
        }
    };
    Err(Error::Remote {
        code: status.as_u16(),
        body,
    })
}

/// One day's worth of work, as submitted to both services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub hours: String,
    pub note: String,
}

fn credentials(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    group: &str,
    service: &str,
) -> Result<Credentials> {
    let login = cache.get_or_prompt(
        group,
        "login",
        prompter,
        Ask::Plain(&format!("Please input your {} login:", service)),
    )?;
    let password = cache.get_or_prompt(
        group,
        "password",
        prompter,
        Ask::Secret(&format!("Please input your {} password:", service)),
    )?;
    Ok(Credentials::new(login, password))
}

pub async fn submit_rubytime(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    entry: &DailyEntry,
) -> Result<()> {
    let creds = credentials(cache, prompter, RUBYTIME, "RubyTime")?;
    let client = RubyTimeClient::new(&cache.get_or_default(RUBYTIME, "url", rubytime::DEFAULT_URL)?)?;

    let mut session = FormSession::new()?;
    client.login(&mut session, &creds).await?;

    let projects = client.list_selectable_projects(&session).await?;
    let project = select(cache, prompter, RUBYTIME, "Project", &projects)?;
    prompter.show(&format!("Selected RubyTime Project: {}", project.item.text), None);

    client
        .submit_entry(
            &mut session,
            project.item,
            &wire_format(entry.date),
            &entry.hours,
            &entry.note,
        )
        .await
}

pub async fn submit_tickspot(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    entry: &DailyEntry,
) -> Result<()> {
    let creds = credentials(cache, prompter, TICKSPOT, "TickSpot")?;
    let client = TickSpotClient::new(
        &cache.get_or_default(TICKSPOT, "url", tickspot::DEFAULT_URL)?,
        creds,
    )?;

    let taxonomy = client.fetch_taxonomy().await?;
    let client_sel = select(cache, prompter, TICKSPOT, "Client", taxonomy.clients())?;
    let project_sel = select(cache, prompter, TICKSPOT, "Project", &client_sel.item.projects)?;
    let task_sel = select(cache, prompter, TICKSPOT, "Task", &project_sel.item.tasks)?;

    let summary = format!(
        "Client: {}\nProject: {}\nTask: {}",
        client_sel.item.name, project_sel.item.name, task_sel.item.name
    );
    prompter.show("Selected values", Some(&summary));

    client
        .create_entry(&task_sel.id, &entry.hours, &wire_format(entry.date), &entry.note)
        .await?;
    Ok(())
}

/// Submit `entry` to RubyTime, then TickSpot. A TickSpot failure does not
/// undo the RubyTime entry; answers given so far are already on disk.
pub async fn submit_all(
    cache: &mut ConfigCache,
    prompter: &mut dyn Prompter,
    entry: &DailyEntry,
) -> Result<()> {
    submit_rubytime(cache, prompter, entry).await?;
    submit_tickspot(cache, prompter, entry).await?;
    cache.save()
}
