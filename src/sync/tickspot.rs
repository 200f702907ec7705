use reqwest::{Client, Url};
use roxmltree::Node;

use super::{Credentials, ensure_success};
use crate::core::taxonomy::{Project, Task, Taxonomy};
use crate::error::{Error, Result};

pub const DEFAULT_URL: &str = "https://truvolabs.tickspot.com";

/// TickSpot XML API client. Credentials travel in every request body.
pub struct TickSpotClient {
    base_url: Url,
    creds: Credentials,
    http: Client,
}

impl TickSpotClient {
    pub fn new(base_url: &str, creds: Credentials) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Url(format!("{}: {}", base_url, e)))?;
        let http = Client::builder().build()?;
        Ok(Self {
            base_url,
            creds,
            http,
        })
    }

    /// POST to `/api/<path>` and return the body of a 2xx response.
    pub async fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = self
            .base_url
            .join(&format!("/api/{}", path))
            .map_err(|e| Error::Url(format!("{}: {}", path, e)))?;

        let mut form: Vec<(&str, &str)> = vec![
            ("email", self.creds.login.as_str()),
            ("password", self.creds.password.as_str()),
        ];
        form.extend_from_slice(params);

        log::debug!("POST {}", url);
        let resp = ensure_success(self.http.post(url).form(&form).send().await?).await?;
        Ok(resp.text().await?)
    }

    pub async fn fetch_taxonomy(&self) -> Result<Taxonomy> {
        let xml = self.request("projects", &[("open", "true")]).await?;
        let taxonomy = parse_taxonomy(&xml)?;
        log::info!(
            "TickSpot: {} clients, {} open projects",
            taxonomy.len(),
            taxonomy.project_count()
        );
        Ok(taxonomy)
    }

    pub async fn create_entry(&self, task_id: &str, hours: &str, date: &str, notes: &str) -> Result<String> {
        let body = self
            .request(
                "create_entry",
                &[
                    ("task_id", task_id),
                    ("hours", hours),
                    ("date", date),
                    ("notes", notes),
                ],
            )
            .await?;
        log::info!("TickSpot entry created: {} {} on task {}", date, hours, task_id);
        Ok(body)
    }
}

/// The API double-escapes ampersands in names.
fn fix_html(s: &str) -> String {
    s.replace("&amp;", "&")
}

fn child_text(node: Node<'_, '_>, name: &str) -> Result<String> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .map(|n| n.text().unwrap_or("").trim().to_string())
        .ok_or_else(|| {
            Error::Parse(format!(
                "<{}> without <{}>",
                node.tag_name().name(),
                name
            ))
        })
}

fn parse_task(node: Node<'_, '_>) -> Result<Task> {
    Ok(Task {
        id: child_text(node, "id")?,
        name: fix_html(&child_text(node, "name")?),
    })
}

/// Fold the flat `<project>` list into Client -> Project -> Task.
pub fn parse_taxonomy(xml: &str) -> Result<Taxonomy> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| Error::Parse(e.to_string()))?;
    let mut taxonomy = Taxonomy::default();

    for node in doc.descendants().filter(|n| n.has_tag_name("project")) {
        let client_id = child_text(node, "client_id")?;
        let client_name = fix_html(&child_text(node, "client_name")?);

        let tasks = node
            .descendants()
            .filter(|n| n.has_tag_name("task"))
            .map(parse_task)
            .collect::<Result<Vec<_>>>()?;

        let project = Project {
            id: child_text(node, "id")?,
            name: fix_html(&child_text(node, "name")?),
            tasks,
        };
        taxonomy.add_project(&client_id, &client_name, project);
    }

    Ok(taxonomy)
}
