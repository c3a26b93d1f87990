//! Regex/token scanning for languages without a parser.
//!
//! Brace-delimited code is scanned character by character to know which
//! blocks are loop bodies; indentation-delimited code uses an indent stack.
//! Everything else is line-level pattern matching against a per-language
//! profile, so every count here is an approximation.

use super::{Confidence, FeatureVector, Signal, SignalTally};
use crate::language::Language;
use crate::utils::{blank_comments_and_strings, indent_width, LexicalStyle};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Line patterns for one language family.
struct Profile {
    loop_keyword: Regex,
    branch: Regex,
    function_def: Regex,
    alloc: Regex,
    string_decl: Regex,
    await_point: Option<Regex>,
    io: Regex,
    /// Console output, a subset of `io`.
    print: Regex,
    append: Regex,
    index_loop: Regex,
    invariant_header: Regex,
    wildcard_import: Option<Regex>,
}

lazy_static! {
    static ref PYTHON: Profile = Profile {
        loop_keyword: Regex::new(r"^\s*(?:async\s+)?(?:for|while)\b").unwrap(),
        branch: Regex::new(r"\b(?:if|elif|except|and|or|case)\b").unwrap(),
        function_def: Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)").unwrap(),
        alloc: Regex::new(r"\b(?:list|dict|set|bytearray|sorted)\s*\(|\[\s*\]|\{\s*\}|\bcopy\.(?:deep)?copy\s*\(").unwrap(),
        string_decl: Regex::new(r#"^\s*(\w+)\s*=\s*[rbfuRBFU]{0,2}["']"#).unwrap(),
        await_point: Some(Regex::new(r"\bawait\b").unwrap()),
        io: Regex::new(r"\b(?:print|open|input)\s*\(|\brequests\.\w+\s*\(|\burlopen\s*\(|\.(?:read|write|readline|readlines)\s*\(").unwrap(),
        print: Regex::new(r"\bprint\s*\(").unwrap(),
        append: Regex::new(r"\.append\s*\(").unwrap(),
        index_loop: Regex::new(r"\bfor\s+\w+\s+in\s+range\s*\(\s*(?:0\s*,\s*)?len\s*\(").unwrap(),
        invariant_header: Regex::new(r"^\s*while\b.*\blen\s*\(").unwrap(),
        wildcard_import: Some(Regex::new(r"^\s*from\s+\S+\s+import\s+\*").unwrap()),
    };

    static ref JAVASCRIPT: Profile = Profile {
        loop_keyword: Regex::new(r"\b(?:for|while|do)\b|\.(?:forEach|map|filter|reduce)\s*\(").unwrap(),
        branch: Regex::new(r"\b(?:if|case|catch)\b|&&|\|\||\?[^.?:]").unwrap(),
        function_def: Regex::new(
            r"\bfunction\s*\*?\s*(\w+)\s*\(|\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s*)?(?:function\b|\([^)]*\)\s*=>|\w+\s*=>)|^\s*(?:async\s+)?(\w+)\s*\([^)]*\)\s*\{",
        )
        .unwrap(),
        alloc: Regex::new(r"\bnew\s+\w+|[=(,:]\s*\[|[=(,]\s*\{\s*\}|\{\s*\.\.\.|\bArray\.from\s*\(|\.(?:slice|concat)\s*\(").unwrap(),
        string_decl: Regex::new(r#"\b(?:let|var|const)\s+(\w+)\s*(?::\s*string\s*)?=\s*["'`]"#).unwrap(),
        await_point: Some(Regex::new(r"\bawait\b").unwrap()),
        io: Regex::new(r"\bconsole\.\w+\s*\(|\bfetch\s*\(|\bfs\.\w+\s*\(|\baxios\.\w+\s*\(|\bdocument\.write\s*\(|\bprocess\.stdout\.write\s*\(").unwrap(),
        print: Regex::new(r"\bconsole\.\w+\s*\(|\bprocess\.stdout\.write\s*\(").unwrap(),
        append: Regex::new(r"\.push\s*\(").unwrap(),
        index_loop: Regex::new(r"\bfor\s*\(\s*(?:let|var)?\s*\w+\s*=\s*0\s*;\s*\w+\s*<=?\s*[\w.]+\.length\b").unwrap(),
        invariant_header: Regex::new(r"\b(?:for|while)\s*\(.*(?:\.size\s*\(\s*\)|\bObject\.keys\s*\()").unwrap(),
        wildcard_import: Some(Regex::new(r"^\s*import\s+\*\s+as\s+\w+").unwrap()),
    };

    static ref JAVA: Profile = Profile {
        loop_keyword: Regex::new(r"\b(?:for|while|do)\b|\.forEach\s*\(").unwrap(),
        branch: Regex::new(r"\b(?:if|case|catch)\b|&&|\|\||\?[^.?:]").unwrap(),
        function_def: Regex::new(
            r"^\s*(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)*[\w<>\[\],.?]+\s+(\w+)\s*\([^;]*$",
        )
        .unwrap(),
        alloc: Regex::new(r"\bnew\s+\w+").unwrap(),
        string_decl: Regex::new(r"\bString\s+(\w+)").unwrap(),
        await_point: Some(Regex::new(r"\.join\s*\(\s*\)").unwrap()),
        io: Regex::new(r"\bSystem\.(?:out|err)\.print\w*\s*\(|\bnew\s+File(?:Reader|Writer|InputStream|OutputStream)\b|\bFiles\.\w+\s*\(|\.readLine\s*\(|\.execute(?:Query|Update)?\s*\(").unwrap(),
        print: Regex::new(r"\bSystem\.(?:out|err)\.print\w*\s*\(").unwrap(),
        append: Regex::new(r"\.add\s*\(").unwrap(),
        index_loop: Regex::new(r"\bfor\s*\(\s*int\s+\w+\s*=\s*0\s*;\s*\w+\s*<=?\s*[\w.]+\.(?:length\b|size\s*\()").unwrap(),
        invariant_header: Regex::new(r"\b(?:for|while)\s*\(.*(?:\.size\s*\(\s*\)|\.length\s*\(\s*\))").unwrap(),
        wildcard_import: Some(Regex::new(r"^\s*import\s+(?:static\s+)?[\w.]+\.\*\s*;").unwrap()),
    };

    static ref CPP: Profile = Profile {
        loop_keyword: Regex::new(r"\b(?:for|while|do)\b|\bstd::for_each\b").unwrap(),
        branch: Regex::new(r"\b(?:if|case|catch)\b|&&|\|\||\?[^.?:]").unwrap(),
        function_def: Regex::new(
            r"^\s*(?:(?:static|inline|virtual|constexpr|template\s*<[^>]*>)\s+)*[\w:<>,*&\[\]]+\s+[*&]?(?:\w+::)*(\w+)\s*\([^;]*$",
        )
        .unwrap(),
        alloc: Regex::new(r"\bnew\s+\w+|\b(?:malloc|calloc|realloc)\s*\(|\bmake_(?:shared|unique)\s*<|\bstd::(?:vector|map|unordered_map|set|list)\s*<[^;]*>\s+\w+|\bstd::string\s+\w+\s*(?:=|;|\()").unwrap(),
        string_decl: Regex::new(r"\b(?:std::)?string\s+(\w+)").unwrap(),
        await_point: Some(Regex::new(r"\.wait\s*\(\s*\)").unwrap()),
        io: Regex::new(r"\bstd::cout\b|\bcout\s*<<|\bcerr\s*<<|\b(?:printf|fprintf|puts|scanf|fopen|fwrite|fread|getline)\s*\(").unwrap(),
        print: Regex::new(r"\bstd::cout\b|\bcout\s*<<|\bcerr\s*<<|\b(?:printf|puts)\s*\(").unwrap(),
        append: Regex::new(r"\.(?:push_back|emplace_back)\s*\(").unwrap(),
        index_loop: Regex::new(r"\bfor\s*\(\s*(?:int|size_t|unsigned|auto|std::size_t)?\s*\w+\s*=\s*0\s*;\s*\w+\s*<=?\s*[\w.]+\.size\s*\(").unwrap(),
        invariant_header: Regex::new(r"\b(?:for|while)\s*\(.*(?:\bstrlen\s*\(|\.size\s*\(\s*\)|\.length\s*\(\s*\))").unwrap(),
        wildcard_import: None,
    };

    static ref GENERIC: Profile = Profile {
        loop_keyword: Regex::new(r"(?i)\b(?:for|foreach|while|loop|until|repeat|perform)\b").unwrap(),
        branch: Regex::new(r"(?i)\b(?:if|elif|elsif|when|case|catch|except)\b|&&|\|\|").unwrap(),
        function_def: Regex::new(r"(?i)^\s*(?:def|function|func|fn|sub|procedure|proc)\s+(\w+)").unwrap(),
        alloc: Regex::new(r"\bnew\s+\w+|\bmalloc\s*\(|\[\s*\]").unwrap(),
        string_decl: Regex::new(r#"\b(\w+)\s*=\s*["']"#).unwrap(),
        await_point: Some(Regex::new(r"\bawait\b").unwrap()),
        io: Regex::new(r"(?i)\b(?:print|println|printf|puts|echo|display|accept|open|read|write)\b").unwrap(),
        print: Regex::new(r"(?i)\b(?:print|println|printf|puts|echo|display)\b").unwrap(),
        append: Regex::new(r"\.(?:append|push|add|push_back)\s*\(").unwrap(),
        index_loop: Regex::new(r"(?i)\bfor\b.*\b(?:len|length|size|count)\b").unwrap(),
        invariant_header: Regex::new(r"(?i)\b(?:for|while)\b.*\b(?:len|length|size|strlen)\s*\(").unwrap(),
        wildcard_import: Some(Regex::new(r"^\s*(?:from\s+\S+\s+import\s+\*|import\s+[\w.]+\.\*)").unwrap()),
    };

    /// `name += rest`
    static ref AUG_ADD: Regex = Regex::new(r"\b([A-Za-z_]\w*)\s*\+=\s*(.*)").unwrap();

    /// A bare numeric literal, as in a counter step.
    static ref NUMBER_STEP: Regex = Regex::new(r"^\s*\d+(?:\.\d+)?[lLfFdDuU]*\s*;?\s*$").unwrap();

    /// `name = other + rest`, only an accumulation when both names match.
    static ref SELF_ADD: Regex = Regex::new(r"\b([A-Za-z_]\w*)\s*=\s*([A-Za-z_]\w*)\s*\+\s*(.*)").unwrap();

    static ref KEYWORDS: HashSet<&'static str> = [
        "if", "for", "while", "switch", "catch", "return", "new", "else", "do", "sizeof", "throw",
        "synchronized", "function", "await", "typeof", "delete",
    ]
    .into_iter()
    .collect();
}

fn profile_for(language: Language) -> &'static Profile {
    match language {
        Language::Python => &PYTHON,
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::Cpp => &CPP,
        Language::Unknown => &GENERIC,
    }
}

/// The function whose body is being scanned.
struct FunctionScope {
    def_line: usize,
    recursive: bool,
    /// Matches a call to this function by name.
    self_call: Option<Regex>,
}

impl FunctionScope {
    fn new(name: &str, def_line: usize) -> Self {
        let pattern = format!(r"\b{}\s*\(", regex::escape(name));
        Self {
            def_line,
            recursive: false,
            self_call: Regex::new(&pattern).ok(),
        }
    }
}

/// A block on the scanner stack: a brace pair or an indented suite.
struct Frame {
    /// Loops this block is the body of (braceless nesting can stack several).
    loops: usize,
    indent: usize,
    function: Option<FunctionScope>,
}

struct Scanner {
    profile: &'static Profile,
    tally: SignalTally,
    frames: Vec<Frame>,
    string_names: HashSet<String>,
    // brace mode only
    pending_loops: usize,
    pending_function: Option<(String, usize)>,
    paren_depth: usize,
}

impl Scanner {
    fn new(profile: &'static Profile) -> Self {
        Self {
            profile,
            tally: SignalTally::default(),
            frames: Vec::new(),
            string_names: HashSet::new(),
            pending_loops: 0,
            pending_function: None,
            paren_depth: 0,
        }
    }

    fn loop_depth(&self) -> usize {
        self.frames.iter().map(|frame| frame.loops).sum()
    }

    /// Scans brace-delimited code.
    fn scan_braces(&mut self, lines: &[&str]) {
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            // The enclosing function is the one open at the start of the line.
            self.check_recursion(line, line_no);

            if let Some(caps) = self.profile.function_def.captures(line) {
                if let Some(name) = caps.iter().skip(1).flatten().next() {
                    if !KEYWORDS.contains(name.as_str()) {
                        self.tally.bump(Signal::FunctionCount, line_no);
                        self.pending_function = Some((name.as_str().to_string(), line_no));
                    }
                }
            }

            // `} while (cond);` closes a do-loop, it does not open a new one.
            let loop_starts: Vec<usize> = self
                .profile
                .loop_keyword
                .find_iter(line)
                .filter(|m| !(m.as_str() == "while" && line[..m.start()].trim_end().ends_with('}')))
                .map(|m| m.start())
                .collect();

            let mut line_depth = self.loop_depth() + self.pending_loops;
            for (pos, ch) in line.char_indices() {
                if loop_starts.contains(&pos) {
                    self.pending_loops += 1;
                    self.tally.bump(Signal::LoopCount, line_no);
                }
                match ch {
                    '(' => self.paren_depth += 1,
                    ')' => self.paren_depth = self.paren_depth.saturating_sub(1),
                    '{' => {
                        let loops = std::mem::take(&mut self.pending_loops);
                        let function = self
                            .pending_function
                            .take()
                            .map(|(name, def_line)| FunctionScope::new(&name, def_line));
                        self.frames.push(Frame {
                            loops,
                            indent: 0,
                            function,
                        });
                        if loops > 0 {
                            let depth = self.loop_depth();
                            self.tally.raise(Signal::NestedLoopDepth, depth as f64, line_no);
                        }
                    }
                    '}' => {
                        self.frames.pop();
                    }
                    ';' if self.paren_depth == 0 => {
                        // End of a braceless loop body, or of a prototype.
                        if self.pending_loops > 0 {
                            let depth = self.loop_depth() + self.pending_loops;
                            self.tally.raise(Signal::NestedLoopDepth, depth as f64, line_no);
                            line_depth = line_depth.max(depth);
                            self.pending_loops = 0;
                        }
                        self.pending_function = None;
                    }
                    _ => {}
                }
                line_depth = line_depth.max(self.loop_depth() + self.pending_loops);
            }

            self.check_line(line, line_no, line_depth);
        }
    }

    /// Scans indentation-delimited code.
    fn scan_indentation(&mut self, lines: &[&str]) {
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let indent = indent_width(line);
            while self.frames.last().map_or(false, |frame| frame.indent >= indent) {
                self.frames.pop();
            }

            self.check_recursion(line, line_no);

            let loops = self.profile.loop_keyword.find_iter(line).count();
            let function = self
                .profile
                .function_def
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|name| name.as_str().to_string());

            let mut line_depth = self.loop_depth();
            if loops > 0 {
                for _ in 0..loops {
                    self.tally.bump(Signal::LoopCount, line_no);
                }
                line_depth += loops;
                self.tally.raise(Signal::NestedLoopDepth, line_depth as f64, line_no);
            }
            if function.is_some() {
                self.tally.bump(Signal::FunctionCount, line_no);
            }
            if loops > 0 || function.is_some() {
                self.frames.push(Frame {
                    loops,
                    indent,
                    function: function.map(|name| FunctionScope::new(&name, line_no)),
                });
            }

            self.check_line(line, line_no, line_depth);
        }
    }

    /// Marks the innermost enclosing function recursive if `line` calls it.
    fn check_recursion(&mut self, line: &str, line_no: usize) {
        let Some(scope) = self.frames.iter_mut().rev().find_map(|frame| frame.function.as_mut()) else {
            return;
        };
        if scope.recursive || scope.def_line == line_no {
            return;
        }
        if scope.self_call.as_ref().map_or(false, |call| call.is_match(line)) {
            scope.recursive = true;
            self.tally.bump(Signal::RecursionCount, line_no);
        }
    }

    /// Classifies `+=` and `x = x + ...` inside a loop.
    fn check_accumulation(&mut self, line: &str, line_no: usize) {
        let mut target = None;
        if let Some(caps) = AUG_ADD.captures(line) {
            target = Some((caps[1].to_string(), caps[2].to_string()));
        } else if let Some(caps) = SELF_ADD.captures(line) {
            if caps[1] == caps[2] {
                target = Some((caps[1].to_string(), caps[3].to_string()));
            }
        }
        let Some((name, rest)) = target else {
            return;
        };

        if self.string_names.contains(&name) || rest.contains(['"', '\'', '`']) {
            self.tally.bump(Signal::StringConcatInLoopCount, line_no);
        } else if !NUMBER_STEP.is_match(&rest) {
            self.tally.bump(Signal::ManualAccumulationCount, line_no);
        }
    }

    fn check_line(&mut self, line: &str, line_no: usize, depth: usize) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let profile = self.profile;
        let in_loop = depth > 0;
        let is_header = profile.loop_keyword.is_match(line);

        // Lines holding only braces or punctuation are not statements.
        if trimmed.chars().any(|c| c.is_alphanumeric()) {
            self.tally.add(Signal::StatementCount, 1.0);
        }

        for _ in profile.branch.find_iter(line) {
            self.tally.bump(Signal::BranchCount, line_no);
        }

        if let Some(name) = profile.string_decl.captures(line).and_then(|caps| caps.get(1)) {
            self.string_names.insert(name.as_str().to_string());
        }

        if profile.index_loop.is_match(line) {
            self.tally.bump(Signal::IndexIterationCount, line_no);
        }
        if is_header && profile.invariant_header.is_match(line) {
            self.tally.bump(Signal::InvariantCallInLoopCount, line_no);
        }
        if profile.wildcard_import.as_ref().map_or(false, |re| re.is_match(line)) {
            self.tally.bump(Signal::WildcardImportCount, line_no);
        }

        for _ in profile.io.find_iter(line) {
            self.tally.bump(Signal::IoCallCount, line_no);
            if in_loop {
                self.tally.bump(Signal::IoInLoopCount, line_no);
            }
        }
        if in_loop {
            for _ in profile.print.find_iter(line) {
                self.tally.bump(Signal::PrintInLoopCount, line_no);
            }
        }

        if !in_loop {
            return;
        }

        for _ in profile.alloc.find_iter(line) {
            self.tally.bump(Signal::AllocInLoopCount, line_no);
        }
        if let Some(await_point) = &profile.await_point {
            for _ in await_point.find_iter(line) {
                self.tally.bump(Signal::AwaitInLoopCount, line_no);
            }
        }
        if profile.append.is_match(line) {
            self.tally.bump(Signal::AppendInLoopCount, line_no);
        }
        // Loop headers carry their own `i += 1` style steps.
        if !is_header {
            self.check_accumulation(line, line_no);
        }
    }
}

/// Extracts approximate features from `code` without parsing it.
pub fn extract(code: &str, language: Language) -> FeatureVector {
    let cleaned = blank_comments_and_strings(code, LexicalStyle::for_language(language));
    let lines: Vec<&str> = cleaned.lines().collect();

    // Unknown languages only get brace scanning when they actually use braces.
    let braces = match language {
        Language::Unknown => cleaned.contains('{'),
        other => other.uses_braces(),
    };

    let mut scanner = Scanner::new(profile_for(language));
    if braces {
        scanner.scan_braces(&lines);
    } else {
        scanner.scan_indentation(&lines);
    }

    scanner.tally.finish(code, language, Confidence::Heuristic)
}
