use anyhow::Result;

use crate::commands::Session;
use crate::editor::EditorCommand;

/// What `gwt config` should do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigAction {
    /// Open the config file in the configured editor.
    #[default]
    Open,
    Reset,
    Set { key: String, value: String },
    Show,
    Path,
}

/// # Errors
/// Returns an error if the config file cannot be written or a `set` value is
/// invalid.
pub fn run_config(session: &Session<'_>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Reset => {
            session.config.reset()?;
            println!("Config reset to defaults");
        }
        ConfigAction::Set { key, value } => {
            session.config.set(&key, &value)?;
            println!("Set {key} = {value}");
        }
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&session.config.get())?);
        }
        ConfigAction::Path => println!("{}", session.config.path().display()),
        ConfigAction::Open => open_config(session)?,
    }
    Ok(())
}

/// Opens the config file, writing the defaults first if it does not exist.
/// Prints the path instead when there is no editor or it fails to start.
fn open_config(session: &Session<'_>) -> Result<()> {
    let config = session.config.get();
    let path = session.config.path();

    let Some(editor) = EditorCommand::resolve(config.editor, session.env_editor.as_deref()) else {
        println!("{}", path.display());
        return Ok(());
    };

    if !path.exists() {
        session.config.reset()?;
    }

    if let Err(e) = editor.open(session.runner, &path) {
        log::debug!("{}", e);
        println!("{}", path.display());
    }
    Ok(())
}
