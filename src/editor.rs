use std::path::Path;

use crate::config::Editor;
use crate::error::GwtError;
use crate::traits::CommandRunner;

/// Used when the editor is `default` and `$EDITOR` is unset.
pub const FALLBACK_EDITOR: &str = "vim";

/// A resolved editor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Terminal editors take over the terminal until they exit.
    pub attached: bool,
}

impl EditorCommand {
    /// Resolves the configured editor; `None` when editing is disabled.
    ///
    /// `$EDITOR` may carry flags (`code -w`), which are split on whitespace.
    #[must_use]
    pub fn resolve(editor: Editor, env_editor: Option<&str>) -> Option<Self> {
        match editor {
            Editor::Code => Some(Self::gui("code")),
            Editor::Cursor => Some(Self::gui("cursor")),
            Editor::FromEnv => {
                let command = env_editor
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(FALLBACK_EDITOR);
                let mut parts = command.split_whitespace().map(ToString::to_string);
                let program = parts.next().unwrap_or_else(|| FALLBACK_EDITOR.to_string());
                Some(Self {
                    program,
                    args: parts.collect(),
                    attached: true,
                })
            }
            Editor::Disabled => None,
        }
    }

    fn gui(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            attached: false,
        }
    }

    /// The command line as shown in step output.
    #[must_use]
    pub fn display(&self, target: &str) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.push(target);
        parts.join(" ")
    }

    /// Opens `path` in the editor.
    ///
    /// # Errors
    /// Returns [`GwtError::EditorLaunchFailed`] if the editor cannot be
    /// started or exits unsuccessfully.
    pub fn open(&self, runner: &dyn CommandRunner, path: &Path) -> Result<(), GwtError> {
        let path = path.to_string_lossy();
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(&path);

        let result = if self.attached {
            runner.run_attached(&self.program, &args, None)
        } else {
            runner.run(&self.program, &args, None).map(drop)
        };

        result.map_err(|e| GwtError::EditorLaunchFailed(e.summary().to_string()))
    }
}
