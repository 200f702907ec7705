use reqwest::{Client, Response, Url};

use super::html_form::{FormMethod, HtmlForm, SelectOption, parse_forms};
use super::{Credentials, ensure_success};
use crate::error::{Error, Result};

pub const DEFAULT_URL: &str = "http://rt.llp.pl";

pub const LOGIN_PATH: &str = "/login";
pub const NEW_ENTRY_PATH: &str = "/activities/new";

pub const LOGIN_FIELD: &str = "login";
pub const PASSWORD_FIELD: &str = "password";
pub const PROJECT_FIELD: &str = "activity[project_id]";
pub const DATE_FIELD: &str = "activity[date]";
pub const HOURS_FIELD: &str = "activity[hours]";
pub const COMMENTS_FIELD: &str = "activity[comments]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Submitted,
}

/// One login session: the cookie jar plus where we are in the workflow.
pub struct FormSession {
    http: Client,
    state: SessionState,
}

impl FormSession {
    pub fn new() -> Result<Self> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            state: SessionState::Unauthenticated,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn require_authenticated(&self) -> Result<()> {
        match self.state {
            SessionState::Authenticated => Ok(()),
            SessionState::Unauthenticated => Err(Error::NotAuthenticated),
            SessionState::Submitted => Err(Error::AlreadySubmitted),
        }
    }
}

/// Drives the RubyTime HTML forms.
pub struct RubyTimeClient {
    base_url: Url,
}

impl RubyTimeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Url(format!("{}: {}", base_url, e)))?;
        Ok(Self { base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Url(format!("{}: {}", path, e)))
    }

    async fn fetch_forms(&self, session: &FormSession, path: &str) -> Result<Vec<HtmlForm>> {
        let url = self.url(path)?;
        log::debug!("GET {}", url);
        let resp = ensure_success(session.http.get(url).send().await?).await?;
        let page_url = resp.url().clone();
        let html = resp.text().await?;
        Ok(parse_forms(&html, &page_url))
    }

    async fn submit(&self, session: &FormSession, form: &HtmlForm) -> Result<Response> {
        let pairs = form.pairs();
        log::debug!("Submitting form to {} ({} fields)", form.action, pairs.len());
        let req = match form.method {
            FormMethod::Post => session.http.post(form.action.clone()).form(&pairs),
            FormMethod::Get => session.http.get(form.action.clone()).query(&pairs),
        };
        ensure_success(req.send().await?).await
    }

    /// Fill in and submit the login form. The response body is not inspected;
    /// bad credentials only surface when the entry page is fetched.
    pub async fn login(&self, session: &mut FormSession, creds: &Credentials) -> Result<()> {
        let mut form = self
            .fetch_forms(session, LOGIN_PATH)
            .await?
            .into_iter()
            .find(|f| f.action_path() == LOGIN_PATH)
            .ok_or_else(|| Error::Protocol(format!("Form {}", LOGIN_PATH)))?;

        form.set(LOGIN_FIELD, &creds.login)?;
        form.set(PASSWORD_FIELD, &creds.password)?;
        self.submit(session, &form).await?;

        session.state = SessionState::Authenticated;
        log::info!("Submitted RubyTime login for {}", creds.login);
        Ok(())
    }

    async fn entry_form(&self, session: &FormSession) -> Result<HtmlForm> {
        self.fetch_forms(session, NEW_ENTRY_PATH)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Protocol("Form".to_string()))
    }

    /// Project options offered by the new-activity form, in page order.
    pub async fn list_selectable_projects(&self, session: &FormSession) -> Result<Vec<SelectOption>> {
        session.require_authenticated()?;
        let form = self.entry_form(session).await?;
        Ok(form.require_field(PROJECT_FIELD)?.options().to_vec())
    }

    /// Submit one activity. The form is fetched again because its hidden
    /// token may be single-use.
    pub async fn submit_entry(
        &self,
        session: &mut FormSession,
        project: &SelectOption,
        date: &str,
        hours: &str,
        comments: &str,
    ) -> Result<()> {
        session.require_authenticated()?;
        let mut form = self.entry_form(session).await?;

        let select = form.require_field(PROJECT_FIELD)?;
        if !select.options().iter().any(|o| o.value == project.value) {
            return Err(Error::Protocol(format!(
                "Option '{}' in {}",
                project.text, PROJECT_FIELD
            )));
        }

        form.set(PROJECT_FIELD, &project.value)?;
        form.set(DATE_FIELD, date)?;
        form.set(HOURS_FIELD, hours)?;
        form.set(COMMENTS_FIELD, comments)?;
        self.submit(session, &form).await?;

        session.state = SessionState::Submitted;
        log::info!("RubyTime entry submitted: {} {} on project {}", date, hours, project.value);
        Ok(())
    }
}
