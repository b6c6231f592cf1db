//! Subcommand handlers. Each prints its result as pretty JSON on stdout.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;

use coursedesk_core::api::{FilePart, MultipartForm};
use coursedesk_core::guard::Navigation;
use coursedesk_core::models::{CategoryInput, Credentials, Registration, ResourceId};
use coursedesk_core::resources::CoursePayload;
use coursedesk_core::{ApiClient, AuthApi, CategoryApi, Config, CourseApi, RouteGuard, Session};

use crate::{CategoryCommand, Command, ConfigCommand, CourseBody, CourseCommand};

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

pub async fn run(command: Command, client: ApiClient, session: Session) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password_or_prompt(password)?);
            let response = AuthApi::new(client).login(&credentials).await?;
            print_json(&json!({ "user": response.user, "message": response.message }))
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let registration = Registration {
                name,
                email,
                password_confirmation: Some(password.clone()),
                password,
            };
            let response = AuthApi::new(client).register(&registration).await?;
            print_json(&json!({
                "user": response.user,
                "message": response.message,
                "signed_in": session.is_authenticated(),
            }))
        }
        Command::Logout => print_json(&AuthApi::new(client).logout().await?),
        Command::Status => print_json(&json!({
            "authenticated": session.is_authenticated(),
            "since": session.data().map(|d| d.created_at),
            "api_url": client.base_url().as_str(),
        })),
        Command::Categories(cmd) => categories(cmd, CategoryApi::new(client)).await,
        Command::Courses(cmd) => courses(cmd, CourseApi::new(client)).await,
        Command::Route { path } => {
            let decision = match RouteGuard::new(session).check(&path) {
                Navigation::Allow => json!({ "path": path, "allow": true }),
                Navigation::Redirect(to) => json!({ "path": path, "redirect": to }),
            };
            print_json(&decision)
        }
        // Handled before the client is built
        Command::Config(_) => Ok(()),
    }
}

async fn categories(cmd: CategoryCommand, api: CategoryApi) -> Result<()> {
    match cmd {
        CategoryCommand::List { page } => print_json(&api.list(page).await?),
        CategoryCommand::Get { id } => print_json(&api.get(&ResourceId::from(id.as_str())).await?),
        CategoryCommand::Create { name, description } => {
            let input = CategoryInput { name, description };
            print_json(&api.create(&input).await?)
        }
        CategoryCommand::Update {
            id,
            name,
            description,
        } => {
            let input = CategoryInput { name, description };
            print_json(&api.update(&ResourceId::from(id.as_str()), &input).await?)
        }
        CategoryCommand::Delete { id } => {
            print_json(&api.delete(&ResourceId::from(id.as_str())).await?)
        }
    }
}

async fn courses(cmd: CourseCommand, api: CourseApi) -> Result<()> {
    match cmd {
        CourseCommand::List { page } => print_json(&api.list(page).await?),
        CourseCommand::Get { id } => print_json(&api.get(&ResourceId::from(id.as_str())).await?),
        CourseCommand::Create { body } => print_json(&api.create(course_payload(body)?).await?),
        CourseCommand::Update { id, body } => {
            let id = ResourceId::from(id.as_str());
            print_json(&api.update(&id, course_payload(body)?).await?)
        }
        CourseCommand::Delete { id } => {
            print_json(&api.delete(&ResourceId::from(id.as_str())).await?)
        }
        CourseCommand::Export { output } => {
            let bytes = api.export().await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_json(&json!({ "output": output, "bytes": bytes.len() }))
        }
        CourseCommand::Import { path } => print_json(&api.import(read_file(&path)?).await?),
    }
}

fn read_file(path: &Path) -> Result<FilePart> {
    FilePart::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Turn the CLI body options into a JSON or multipart course payload
fn course_payload(body: CourseBody) -> Result<CoursePayload> {
    if let Some(raw) = body.json {
        let value: serde_json::Value =
            serde_json::from_str(&raw).context("--json is not valid JSON")?;
        return Ok(CoursePayload::Json(value));
    }

    let mut form = MultipartForm::new();
    for field in &body.field {
        let Some((key, value)) = field.split_once('=') else {
            bail!("--field expects KEY=VALUE, got `{}`", field);
        };
        form = form.text(key, value);
    }
    if let Some(path) = &body.file {
        form = form.file(body.file_field, read_file(path)?);
    }
    if form.is_empty() {
        bail!("Provide --json, or at least one --field or --file");
    }
    Ok(CoursePayload::Multipart(form))
}

pub fn config(cmd: ConfigCommand, mut config: Config) -> Result<()> {
    match cmd {
        ConfigCommand::Show => print_json(&json!({
            "path": Config::config_path()?,
            "config": config,
            "cache_dir": Config::cache_dir()?,
        })),
        ConfigCommand::SetUrl { url } => {
            check_api_url(&url)?;
            config.api_url = url;
            config.save()?;
            print_json(&config)
        }
    }
}

fn check_api_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("API URL must start with http:// or https://");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursedesk_core::api::PartValue;

    fn body(json: Option<&str>, fields: &[&str]) -> CourseBody {
        CourseBody {
            json: json.map(str::to_string),
            field: fields.iter().map(|f| f.to_string()).collect(),
            file: None,
            file_field: "image".to_string(),
        }
    }

    #[test]
    fn test_course_payload_json() {
        let payload = course_payload(body(Some(r#"{"title":"Rust"}"#), &[])).unwrap();
        assert_eq!(payload, CoursePayload::Json(json!({"title": "Rust"})));
        assert!(course_payload(body(Some("{"), &[])).is_err());
    }

    #[test]
    fn test_course_payload_fields() {
        let payload = course_payload(body(None, &["title=Rust", "price=10=ten"])).unwrap();
        let CoursePayload::Multipart(form) = payload else {
            panic!("expected multipart");
        };
        assert_eq!(form.get("title"), Some(&PartValue::Text("Rust".to_string())));
        assert_eq!(form.get("price"), Some(&PartValue::Text("10=ten".to_string())));
    }

    #[test]
    fn test_course_payload_rejects_empty_and_malformed() {
        assert!(course_payload(body(None, &[])).is_err());
        assert!(course_payload(body(None, &["no-equals"])).is_err());
    }

    #[test]
    fn test_url_check() {
        assert!(check_api_url("https://api.example.com").is_ok());
        assert!(check_api_url("ftp://example.com").is_err());
    }
}
