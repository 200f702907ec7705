//! Owned model of the forms found on a fetched HTML page.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::core::selector::Selectable;
use crate::error::{Error, Result};

static FORM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").unwrap());
static FIELD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, select, textarea").unwrap());
static OPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl Selectable for SelectOption {
    fn id(&self) -> &str {
        &self.value
    }
    fn name(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Input { input_type: String, checked: bool },
    TextArea,
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    /// Options of a `<select>`, empty for any other field.
    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            FieldKind::Select { options } => options,
            _ => &[],
        }
    }

    /// Whether a browser would include this field in the submission.
    fn is_successful(&self) -> bool {
        match &self.kind {
            FieldKind::Input { input_type, checked } => match input_type.as_str() {
                "submit" | "button" | "reset" | "image" | "file" => false,
                "checkbox" | "radio" => *checked,
                _ => true,
            },
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HtmlForm {
    /// Action resolved against the page URL.
    pub action: Url,
    pub method: FormMethod,
    pub fields: Vec<FormField>,
}

impl HtmlForm {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FormField> {
        self.field(name)
            .ok_or_else(|| Error::Protocol(format!("field {}", name)))
    }

    /// Set the value of the field called `name`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self
            .field_mut(name)
            .ok_or_else(|| Error::Protocol(format!("field {}", name)))?;
        field.value = value.to_string();
        Ok(())
    }

    /// Name/value pairs a browser would submit, in document order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| f.is_successful())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn action_path(&self) -> &str {
        self.action.path()
    }
}

/// Parse every `<form>` on the page, in document order.
pub fn parse_forms(html: &str, page_url: &Url) -> Vec<HtmlForm> {
    let doc = Html::parse_document(html);
    doc.select(&FORM)
        .map(|form| parse_form(form, page_url))
        .collect()
}

fn parse_form(form: ElementRef<'_>, page_url: &Url) -> HtmlForm {
    let el = form.value();
    let action = el
        .attr("action")
        .filter(|a| !a.trim().is_empty())
        .and_then(|a| page_url.join(a.trim()).ok())
        .unwrap_or_else(|| page_url.clone());
    let method = match el.attr("method") {
        Some(m) if m.eq_ignore_ascii_case("get") => FormMethod::Get,
        Some(_) => FormMethod::Post,
        None => FormMethod::Get,
    };

    let fields = form.select(&FIELD).filter_map(parse_field).collect();

    HtmlForm {
        action,
        method,
        fields,
    }
}

fn parse_field(node: ElementRef<'_>) -> Option<FormField> {
    let el = node.value();
    let name = el.attr("name")?.to_string();

    let field = match el.name() {
        "select" => {
            let options: Vec<SelectOption> = node
                .select(&OPTION)
                .map(|opt| {
                    let text = collapse_whitespace(&opt.text().collect::<String>());
                    let value = opt
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| text.clone());
                    SelectOption { value, text }
                })
                .collect();
            let value = node
                .select(&OPTION)
                .zip(&options)
                .find(|(opt, _)| opt.value().attr("selected").is_some())
                .map(|(_, o)| o.value.clone())
                .or_else(|| options.first().map(|o| o.value.clone()))
                .unwrap_or_default();
            FormField {
                name,
                value,
                kind: FieldKind::Select { options },
            }
        }
        "textarea" => FormField {
            name,
            value: node.text().collect(),
            kind: FieldKind::TextArea,
        },
        _ => {
            let input_type = el.attr("type").unwrap_or("text").to_lowercase();
            let default = if input_type == "checkbox" || input_type == "radio" {
                "on"
            } else {
                ""
            };
            FormField {
                name,
                value: el.attr("value").unwrap_or(default).to_string(),
                kind: FieldKind::Input {
                    checked: el.attr("checked").is_some(),
                    input_type,
                },
            }
        }
    };
    Some(field)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
