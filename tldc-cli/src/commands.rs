use anyhow::{bail, Context, Result};
use tldc_core::Session;
use tokio::io::AsyncReadExt;

pub async fn list_models(session: &Session) -> Result<()> {
    let models = session.models().await?;
    let active = session.active_model().await.ok().map(|m| m.name);

    let name_width = models
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("  {:<name_width$}  {:<8}  SETTINGS", "NAME", "PROVIDER");
    for model in models {
        let marker = if active.as_deref() == Some(model.name.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:<name_width$}  {:<8}  {}",
            model.name, model.provider, model.settings
        );
    }
    Ok(())
}

pub async fn add_model(
    session: &Session,
    name: &str,
    provider: &str,
    settings: &str,
) -> Result<()> {
    session.add_model(name, provider, settings).await?;
    println!("Added model {name}");
    Ok(())
}

pub async fn delete_model(session: &Session, name: &str) -> Result<()> {
    if !session.delete_model(name).await? {
        bail!("Model not found: {name}");
    }
    println!("Deleted model {name}");
    Ok(())
}

pub async fn get_model(session: &Session) -> Result<()> {
    let model = session.active_model().await?;
    println!("{}", model.name);
    Ok(())
}

pub async fn set_model(session: &Session, name: &str) -> Result<()> {
    session.set_active_model(name).await?;
    println!("Active model: {name}");
    Ok(())
}

pub async fn prompt(session: &Session) -> Result<()> {
    let mut prompt = String::new();
    tokio::io::stdin()
        .read_to_string(&mut prompt)
        .await
        .context("Failed to read prompt from stdin")?;

    if prompt.trim().is_empty() {
        bail!("Empty prompt");
    }

    let answer = session.prompt(&prompt).await?;
    println!("Response:\n{answer}");
    Ok(())
}

pub async fn reset(session: &Session) -> Result<()> {
    session.reset().await?;
    println!("Context reset for {}", session.workdir().display());
    Ok(())
}
