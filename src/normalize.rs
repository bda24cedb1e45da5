//! Audio normalization through an external tool (ffmpeg by default).

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::NormalizeError;

/// Converts `input` into a normalized file at `output`. Blocking; runs on pool workers.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), NormalizeError>;
}

/// Runs `program args...` with `{input}` and `{output}` substituted in the arguments.
#[derive(Clone, Debug)]
pub struct CommandNormalizer {
    program: String,
    args: Vec<String>,
}

impl CommandNormalizer {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }

    fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

impl Normalizer for CommandNormalizer {
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), NormalizeError> {
        let status = Command::new(&self.program)
            .args(self.build_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| NormalizeError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(NormalizeError::ExitStatus {
                program: self.program.clone(),
                status,
                input: input.to_path_buf(),
            });
        }
        if !output.is_file() {
            return Err(NormalizeError::MissingOutput {
                program: self.program.clone(),
                output: output.to_path_buf(),
            });
        }
        Ok(())
    }
}
