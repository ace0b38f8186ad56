use crate::EmissionError;
use halgen_codegen::OutputFile;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::debug;

/// Writes rendered modules to disk and runs the formatter over each of them
#[derive(Clone, Debug)]
pub struct FileEmitter<'a> {
    output_dir: &'a Path,
    formatter: &'a [String],
}

impl<'a> FileEmitter<'a> {
    pub fn new(output_dir: &'a Path, formatter: &'a [String]) -> Self {
        Self {
            output_dir,
            formatter,
        }
    }

    /// Writes `file` into the output directory, creating it if missing, then
    /// formats it. Returns the number of bytes written.
    pub fn emit(&self, file: &OutputFile) -> Result<usize, EmissionError> {
        fs::create_dir_all(self.output_dir).map_err(|source| EmissionError::Io {
            path: self.output_dir.to_path_buf(),
            source,
        })?;

        let file_path = self.output_dir.join(&file.name);
        debug!("Writing {}", file_path.display());
        fs::write(&file_path, file.content.as_bytes()).map_err(|source| EmissionError::Io {
            path: file_path.clone(),
            source,
        })?;

        self.format(file_path)?;
        Ok(file.content.len())
    }

    fn format(&self, path: PathBuf) -> Result<(), EmissionError> {
        let Some((program, args)) = self.formatter.split_first() else {
            return Err(EmissionError::Formatter {
                path,
                reason: "no formatter command".to_owned(),
            });
        };
        let status = match Command::new(program).args(args).arg(&path).status() {
            Ok(status) => status,
            Err(err) => {
                return Err(EmissionError::Formatter {
                    path,
                    reason: format!("cannot run `{program}`: {err}"),
                });
            }
        };
        if !status.success() {
            return Err(EmissionError::Formatter {
                path,
                reason: format!("`{program}` exited with {status}"),
            });
        }
        Ok(())
    }
}
