use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Languages the engine knows how to analyze.
///
/// Anything else maps to `Unknown`, which still gets analyzed through the
/// heuristic extractor with the generic rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    Unknown,
}

/// How faithfully a language can be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// A real parser is available and produces a syntax tree.
    FullParser,
    /// Only regex/token scanning is available.
    HeuristicOnly,
}

impl Language {
    /// Every supported (non-`Unknown`) language.
    pub const SUPPORTED: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Cpp,
    ];

    /// Maps a user-supplied language name to a `Language`.
    ///
    /// Matching is case-insensitive and accepts the usual short aliases.
    /// Unrecognized names yield `Unknown` rather than an error.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Language::Python,
            "javascript" | "js" | "node" | "nodejs" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "java" => Language::Java,
            "cpp" | "c++" | "cxx" | "cc" | "c" => Language::Cpp,
            _ => Language::Unknown,
        }
    }

    /// Detects the language from a file extension.
    ///
    /// Returns `None` for files the batch analyzer should skip.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "py" | "pyw" => Some(Language::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" | "tsx" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "c" | "h" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Language::Python => Capability::FullParser,
            _ => Capability::HeuristicOnly,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Unknown => "unknown",
        }
    }

    /// Relative cost of one abstract operation, compiled code being cheapest.
    ///
    /// C++ is the unit. Java and the JS engines pay JIT/runtime overhead,
    /// CPython pays interpreter dispatch on every bytecode.
    pub fn efficiency_factor(self) -> f64 {
        match self {
            Language::Cpp => 1.0,
            Language::Java => 1.8,
            Language::JavaScript | Language::TypeScript => 2.5,
            Language::Python => 7.5,
            Language::Unknown => 5.0,
        }
    }

    /// Baseline resident memory of the runtime, in megabytes.
    pub fn runtime_memory_mb(self) -> f64 {
        match self {
            Language::Cpp => 1.5,
            Language::Java => 32.0,
            Language::JavaScript | Language::TypeScript => 8.0,
            Language::Python => 9.0,
            Language::Unknown => 10.0,
        }
    }

    /// Whether blocks are delimited by braces rather than indentation.
    pub fn uses_braces(self) -> bool {
        !matches!(self, Language::Python)
    }
}

impl From<&str> for Language {
    fn from(name: &str) -> Self {
        Language::from_name(name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!(Language::from_name("Python"), Language::Python);
        assert_eq!(Language::from_name(" ts "), Language::TypeScript);
        assert_eq!(Language::from_name("C++"), Language::Cpp);
        assert_eq!(Language::from_name("cobol"), Language::Unknown);
        assert_eq!(Language::from_name(""), Language::Unknown);
    }

    #[test]
    fn test_only_python_has_a_parser() {
        assert_eq!(Language::Python.capability(), Capability::FullParser);
        for lang in [Language::JavaScript, Language::Java, Language::Cpp, Language::Unknown] {
            assert_eq!(lang.capability(), Capability::HeuristicOnly);
        }
    }

    #[test]
    fn test_compiled_cheaper_than_interpreted() {
        assert!(Language::Cpp.efficiency_factor() < Language::Java.efficiency_factor());
        assert!(Language::Java.efficiency_factor() < Language::JavaScript.efficiency_factor());
        assert!(Language::JavaScript.efficiency_factor() < Language::Python.efficiency_factor());
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(Language::from_path(Path::new("a/b.py")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("x.tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
    }
}
