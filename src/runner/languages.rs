//! Language-specific build and run commands for the sandbox

use crate::{
    constants::{container_images, languages},
    error::{AppError, AppResult},
};

/// How to build and run one language inside its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageHandler {
    language: &'static str,
    image: &'static str,
    source_file: &'static str,
    compile_command: Option<&'static str>,
    run_command: &'static str,
}

impl LanguageHandler {
    /// Get handler for a specific language
    pub fn for_language(language: &str) -> AppResult<Self> {
        let handler = match language {
            languages::JAVASCRIPT => Self {
                language: languages::JAVASCRIPT,
                image: container_images::JAVASCRIPT,
                source_file: "solution.js",
                compile_command: Some("node --check /workspace/solution.js"),
                run_command: "node /workspace/solution.js",
            },
            languages::PYTHON => Self {
                language: languages::PYTHON,
                image: container_images::PYTHON,
                source_file: "solution.py",
                // Syntax check only
                compile_command: Some("python3 -m py_compile /workspace/solution.py"),
                run_command: "python3 /workspace/solution.py",
            },
            languages::CPP => Self {
                language: languages::CPP,
                image: container_images::CPP,
                source_file: "solution.cpp",
                compile_command: Some(
                    "g++ -O2 -std=c++17 -o /workspace/solution /workspace/solution.cpp",
                ),
                run_command: "/workspace/solution",
            },
            languages::RUST => Self {
                language: languages::RUST,
                image: container_images::RUST,
                source_file: "solution.rs",
                compile_command: Some("rustc -O -o /workspace/solution /workspace/solution.rs"),
                run_command: "/workspace/solution",
            },
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported language: {}",
                    language
                )));
            }
        };

        Ok(handler)
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    pub fn image(&self) -> &'static str {
        self.image
    }

    /// Absolute path of the source file inside the container
    pub fn source_path(&self) -> String {
        format!("/workspace/{}", self.source_file)
    }

    pub fn compile_command(&self) -> Option<&'static str> {
        self.compile_command
    }

    pub fn run_command(&self) -> &'static str {
        self.run_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_language_has_a_handler() {
        for language in languages::ALL {
            let handler = LanguageHandler::for_language(language).unwrap();
            assert_eq!(handler.language(), *language);
            assert!(handler.source_path().starts_with("/workspace/solution."));
        }
    }

    #[test]
    fn test_unknown_language() {
        assert!(matches!(
            LanguageHandler::for_language("brainfuck"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
