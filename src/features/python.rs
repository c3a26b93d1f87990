use super::{Confidence, FeatureVector, Signal, SignalTally};
use crate::language::Language;
use crate::utils::{blank_comments_and_strings, indent_width, LexicalStyle, LineIndex};
use lazy_static::lazy_static;
use rustpython_ast::{self as ast, Expr, Stmt};
use rustpython_parser::{parse, Mode, ParseError};
use std::collections::HashSet;

lazy_static! {
    /// Calls that touch the filesystem, network or a terminal.
    static ref IO_CALLS: HashSet<&'static str> = [
        "print",
        "open",
        "input",
        "os.path.exists",
        "os.path.isfile",
        "os.path.getsize",
        "os.listdir",
        "os.stat",
        "os.remove",
        "os.walk",
        "requests.get",
        "requests.post",
        "requests.put",
        "requests.delete",
        "urlopen",
        "urllib.request.urlopen",
        "json.load",
        "json.dump",
        "sys.stdout.write",
    ]
    .into_iter()
    .collect();

    /// Method names that perform I/O whatever the receiver is.
    static ref IO_METHODS: HashSet<&'static str> = [
        "read",
        "write",
        "readline",
        "readlines",
        "writelines",
        "flush",
        "execute",
        "fetchone",
        "fetchall",
    ]
    .into_iter()
    .collect();

    /// Builtins that build a new container on every call.
    static ref ALLOC_CALLS: HashSet<&'static str> = [
        "list",
        "dict",
        "set",
        "tuple",
        "bytearray",
        "bytes",
        "sorted",
        "copy.copy",
        "copy.deepcopy",
        "deepcopy",
    ]
    .into_iter()
    .collect();

    /// Pure builtins whose result only depends on their arguments.
    static ref PURE_CALLS: HashSet<&'static str> = ["len", "sorted", "max", "min", "sum", "abs"]
        .into_iter()
        .collect();
}

/// Names bound or mutated inside one loop body.
///
/// A pure call whose arguments are all outside this set is treated as loop
/// invariant. Any method call on a name counts as a mutation, which keeps
/// false positives low at the cost of missing some hoistable calls.
struct LoopFrame {
    rebound: HashSet<String>,
}

/// A function currently being visited.
struct FunctionFrame {
    name: String,
    is_method: bool,
    recursive: bool,
}

/// Walks a Python module and tallies structural signals.
pub struct FeatureVisitor<'a> {
    tally: SignalTally,
    line_index: &'a LineIndex,
    loop_depth: usize,
    loop_frames: Vec<LoopFrame>,
    functions: Vec<FunctionFrame>,
    class_depth: usize,
    /// Names last bound to a string literal or f-string.
    string_names: HashSet<String>,
    /// Line of the statement currently being visited.
    current_line: usize,
}

impl<'a> FeatureVisitor<'a> {
    pub fn new(line_index: &'a LineIndex) -> Self {
        Self {
            tally: SignalTally::default(),
            line_index,
            loop_depth: 0,
            loop_frames: Vec::new(),
            functions: Vec::new(),
            class_depth: 0,
            string_names: HashSet::new(),
            current_line: 1,
        }
    }

    /// Consumes the visitor and produces the feature vector for `code`.
    pub fn finish(self, code: &str) -> FeatureVector {
        self.tally.finish(code, Language::Python, Confidence::Full)
    }

    fn line(&self, offset: ast::TextSize) -> usize {
        self.line_index.line_index(offset)
    }

    fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    fn enter_loop(&mut self, rebound: HashSet<String>, line: usize) {
        self.loop_depth += 1;
        self.tally
            .raise(Signal::NestedLoopDepth, self.loop_depth as f64, line);
        self.loop_frames.push(LoopFrame { rebound });
    }

    fn exit_loop(&mut self) {
        self.loop_depth -= 1;
        self.loop_frames.pop();
    }

    /// Visits a statement.
    pub fn visit_stmt(&mut self, stmt: &Stmt) {
        self.tally.add(Signal::StatementCount, 1.0);

        match stmt {
            Stmt::FunctionDef(node) => {
                self.current_line = self.line(node.range.start());
                self.visit_function(node.name.as_str(), &node.body);
            }
            Stmt::AsyncFunctionDef(node) => {
                self.current_line = self.line(node.range.start());
                self.visit_function(node.name.as_str(), &node.body);
            }
            Stmt::ClassDef(node) => {
                self.class_depth += 1;
                self.visit_body(&node.body);
                self.class_depth -= 1;
            }
            Stmt::For(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.visit_for(&node.target, &node.iter, &node.body, &node.orelse, line);
            }
            Stmt::AsyncFor(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.visit_for(&node.target, &node.iter, &node.body, &node.orelse, line);
            }
            Stmt::While(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.tally.bump(Signal::LoopCount, line);

                // The condition is re-evaluated on every iteration, so it
                // belongs to the loop context.
                let rebound = rebound_names(&node.body);
                self.enter_loop(rebound, line);
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                self.exit_loop();
                self.visit_body(&node.orelse);
            }
            Stmt::If(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.tally.bump(Signal::BranchCount, line);
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            Stmt::With(node) => {
                self.current_line = self.line(node.range.start());
                for item in &node.items {
                    self.visit_expr(&item.context_expr);
                }
                self.visit_body(&node.body);
            }
            Stmt::AsyncWith(node) => {
                self.current_line = self.line(node.range.start());
                for item in &node.items {
                    self.visit_expr(&item.context_expr);
                }
                self.visit_body(&node.body);
            }
            Stmt::Try(node) => {
                self.current_line = self.line(node.range.start());
                self.visit_try(&node.body, &node.handlers, &node.orelse, &node.finalbody);
            }
            Stmt::TryStar(node) => {
                self.current_line = self.line(node.range.start());
                self.visit_try(&node.body, &node.handlers, &node.orelse, &node.finalbody);
            }
            Stmt::Match(node) => {
                self.current_line = self.line(node.range.start());
                self.visit_expr(&node.subject);
                for case in &node.cases {
                    self.tally.bump(Signal::BranchCount, self.current_line);
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_body(&case.body);
                }
            }
            Stmt::Assign(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.visit_expr(&node.value);

                if let [Expr::Name(target)] = node.targets.as_slice() {
                    let name = target.id.as_str();
                    // `total = total + x` inside a loop
                    if self.in_loop() {
                        if let Expr::BinOp(bin) = &*node.value {
                            if matches!(bin.op, ast::Operator::Add) && is_name(&bin.left, name) {
                                self.record_accumulation(name, &bin.right, line);
                            }
                        }
                    }
                    if is_string_literal(&node.value) {
                        self.string_names.insert(name.to_string());
                    } else if is_number_literal(&node.value) {
                        self.string_names.remove(name);
                    }
                }
            }
            Stmt::AugAssign(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                self.visit_expr(&node.value);

                if self.in_loop() && matches!(node.op, ast::Operator::Add) {
                    if let Expr::Name(target) = &*node.target {
                        self.record_accumulation(target.id.as_str(), &node.value, line);
                    }
                }
            }
            Stmt::AnnAssign(node) => {
                self.current_line = self.line(node.range.start());
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Expr(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                if self.in_loop() {
                    if let Expr::Call(call) = &*node.value {
                        if let Expr::Attribute(attr) = &*call.func {
                            if attr.attr.as_str() == "append" {
                                self.tally.bump(Signal::AppendInLoopCount, line);
                            }
                        }
                    }
                }
                self.visit_expr(&node.value);
            }
            Stmt::Return(node) => {
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Raise(node) => {
                if let Some(exc) = &node.exc {
                    self.visit_expr(exc);
                }
            }
            Stmt::Assert(node) => {
                self.visit_expr(&node.test);
            }
            Stmt::ImportFrom(node) => {
                let line = self.line(node.range.start());
                self.current_line = line;
                if node.names.iter().any(|alias| alias.name.as_str() == "*") {
                    self.tally.bump(Signal::WildcardImportCount, line);
                }
            }
            _ => {}
        }
    }

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_function(&mut self, name: &str, body: &[Stmt]) {
        self.tally.bump(Signal::FunctionCount, self.current_line);

        // A nested def is not executed per iteration of an enclosing loop.
        let saved_depth = std::mem::replace(&mut self.loop_depth, 0);
        let saved_frames = std::mem::take(&mut self.loop_frames);
        self.functions.push(FunctionFrame {
            name: name.to_string(),
            is_method: self.class_depth > 0,
            recursive: false,
        });

        self.visit_body(body);

        self.functions.pop();
        self.loop_frames = saved_frames;
        self.loop_depth = saved_depth;
    }

    fn visit_for(&mut self, target: &Expr, iter: &Expr, body: &[Stmt], orelse: &[Stmt], line: usize) {
        self.tally.bump(Signal::LoopCount, line);
        if is_index_iteration(iter) {
            self.tally.bump(Signal::IndexIterationCount, line);
        }

        // The iterable is evaluated once, before the first iteration.
        self.visit_expr(iter);

        let mut rebound = rebound_names(body);
        collect_target_names(target, &mut rebound);
        self.enter_loop(rebound, line);
        self.visit_body(body);
        self.exit_loop();

        self.visit_body(orelse);
    }

    fn visit_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ast::ExceptHandler],
        orelse: &[Stmt],
        finalbody: &[Stmt],
    ) {
        self.visit_body(body);
        for handler in handlers {
            let ast::ExceptHandler::ExceptHandler(handler_node) = handler;
            let line = self.line(handler_node.range.start());
            self.tally.bump(Signal::BranchCount, line);
            self.visit_body(&handler_node.body);
        }
        self.visit_body(orelse);
        self.visit_body(finalbody);
    }

    /// Classifies `name += value` (or `name = name + value`) inside a loop.
    ///
    /// Stepping by a numeric literal (`count += 1`) is a counter, not a sum.
    fn record_accumulation(&mut self, name: &str, value: &Expr, line: usize) {
        if self.string_names.contains(name) || self.is_stringy(value) {
            self.tally.bump(Signal::StringConcatInLoopCount, line);
        } else if !is_number_literal(value) {
            self.tally.bump(Signal::ManualAccumulationCount, line);
        }
    }

    /// Whether `expr` evidently produces a string.
    fn is_stringy(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Constant(_) | Expr::JoinedStr(_) => is_string_literal(expr),
            Expr::Name(node) => self.string_names.contains(node.id.as_str()),
            Expr::BinOp(node) => {
                matches!(node.op, ast::Operator::Add)
                    && (self.is_stringy(&node.left) || self.is_stringy(&node.right))
            }
            Expr::Call(node) => match &*node.func {
                Expr::Name(func) => matches!(func.id.as_str(), "str" | "repr" | "format" | "chr"),
                Expr::Attribute(attr) => {
                    is_string_literal(&attr.value)
                        || matches!(attr.attr.as_str(), "join" | "format" | "upper" | "lower" | "strip")
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Visits an expression.
    pub fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Call(node) => {
                let line = self.line(node.range.start());
                self.check_call(node, line);
                for child in child_exprs(expr) {
                    self.visit_expr(child);
                }
            }
            Expr::Await(node) => {
                if self.in_loop() {
                    let line = self.line(node.range.start());
                    self.tally.bump(Signal::AwaitInLoopCount, line);
                }
                self.visit_expr(&node.value);
            }
            Expr::BoolOp(node) => {
                let line = self.line(node.range.start());
                for _ in 1..node.values.len() {
                    self.tally.bump(Signal::BranchCount, line);
                }
                for value in &node.values {
                    self.visit_expr(value);
                }
            }
            Expr::IfExp(node) => {
                let line = self.line(node.range.start());
                self.tally.bump(Signal::BranchCount, line);
                self.visit_expr(&node.test);
                self.visit_expr(&node.body);
                self.visit_expr(&node.orelse);
            }
            Expr::List(node) => {
                if self.in_loop() {
                    let line = self.line(node.range.start());
                    self.tally.bump(Signal::AllocInLoopCount, line);
                }
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Dict(node) => {
                if self.in_loop() {
                    let line = self.line(node.range.start());
                    self.tally.bump(Signal::AllocInLoopCount, line);
                }
                for child in child_exprs(expr) {
                    self.visit_expr(child);
                }
            }
            Expr::Set(node) => {
                if self.in_loop() {
                    let line = self.line(node.range.start());
                    self.tally.bump(Signal::AllocInLoopCount, line);
                }
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::ListComp(node) => {
                let line = self.line(node.range.start());
                self.visit_comprehension(&[node.elt.as_ref()], &node.generators, true, line);
            }
            Expr::SetComp(node) => {
                let line = self.line(node.range.start());
                self.visit_comprehension(&[node.elt.as_ref()], &node.generators, true, line);
            }
            Expr::DictComp(node) => {
                let line = self.line(node.range.start());
                self.visit_comprehension(&[node.key.as_ref(), node.value.as_ref()], &node.generators, true, line);
            }
            Expr::GeneratorExp(node) => {
                let line = self.line(node.range.start());
                self.visit_comprehension(&[node.elt.as_ref()], &node.generators, false, line);
            }
            _ => {
                for child in child_exprs(expr) {
                    self.visit_expr(child);
                }
            }
        }
    }

    /// Comprehensions are loops: each generator adds one nesting level.
    fn visit_comprehension(
        &mut self,
        elements: &[&Expr],
        generators: &[ast::Comprehension],
        allocates: bool,
        line: usize,
    ) {
        if allocates && self.in_loop() {
            self.tally.bump(Signal::AllocInLoopCount, line);
        }
        self.tally.bump(Signal::LoopCount, line);

        let mut entered = 0;
        for generator in generators {
            self.visit_expr(&generator.iter);
            let mut rebound = HashSet::new();
            collect_target_names(&generator.target, &mut rebound);
            self.enter_loop(rebound, line);
            entered += 1;
            for condition in &generator.ifs {
                self.tally.bump(Signal::BranchCount, line);
                self.visit_expr(condition);
            }
        }
        for element in elements {
            self.visit_expr(element);
        }
        for _ in 0..entered {
            self.exit_loop();
        }
    }

    fn check_call(&mut self, call: &ast::ExprCall, line: usize) {
        let Some(name) = call_name(&call.func) else {
            return;
        };
        let in_loop = self.in_loop();

        let method = name.rsplit('.').next().unwrap_or(&name);
        let is_io = IO_CALLS.contains(name.as_str()) || (name.contains('.') && IO_METHODS.contains(method));
        if is_io {
            self.tally.bump(Signal::IoCallCount, line);
            if in_loop {
                self.tally.bump(Signal::IoInLoopCount, line);
                if name == "print" {
                    self.tally.bump(Signal::PrintInLoopCount, line);
                }
            }
        }

        if in_loop {
            let constructs_object = !name.contains('.')
                && name.chars().next().map_or(false, |c| c.is_ascii_uppercase());
            if ALLOC_CALLS.contains(name.as_str()) || constructs_object {
                self.tally.bump(Signal::AllocInLoopCount, line);
            }

            if PURE_CALLS.contains(name.as_str()) && self.is_invariant_call(call) {
                self.tally.bump(Signal::InvariantCallInLoopCount, line);
            }
        }

        self.check_recursion(&name, line);
    }

    /// A pure call is invariant when every argument is a plain name that no
    /// enclosing loop rebinds or mutates.
    fn is_invariant_call(&self, call: &ast::ExprCall) -> bool {
        if call.args.is_empty() || !call.keywords.is_empty() {
            return false;
        }
        call.args.iter().all(|arg| match arg {
            Expr::Name(node) => {
                let id = node.id.as_str();
                !self.loop_frames.iter().any(|frame| frame.rebound.contains(id))
            }
            _ => false,
        })
    }

    fn check_recursion(&mut self, name: &str, line: usize) {
        let Some(frame) = self.functions.last_mut() else {
            return;
        };
        let calls_itself = if frame.is_method {
            name.strip_prefix("self.").map_or(false, |rest| rest == frame.name)
        } else {
            name == frame.name
        };
        if calls_itself && !frame.recursive {
            frame.recursive = true;
            self.tally.bump(Signal::RecursionCount, line);
        }
    }
}

/// Deepest expression nesting the tree walk accepts.
const MAX_EXPR_DEPTH: usize = 200;
/// Deepest block nesting the tree walk accepts.
const MAX_BLOCK_DEPTH: usize = 100;

/// Words that add a level to the expression tree when chained.
const CHAINING_WORDS: &[&str] = &["and", "or", "not", "if", "else", "in", "is", "lambda", "await"];

/// Whether `code` nests too deeply to parse and walk recursively.
///
/// Runs on the text alone so a pathological tree is never built. Each
/// logical line is scanned with one operator counter per open bracket;
/// the sum of counters plus open brackets bounds the tree depth there.
pub fn exceeds_nesting_limit(code: &str) -> bool {
    let cleaned = blank_comments_and_strings(code, LexicalStyle::for_language(Language::Python));
    let mut indents: Vec<usize> = Vec::new();
    let mut chains: Vec<usize> = vec![0];

    for line in cleaned.lines() {
        if chains.len() == 1 {
            chains[0] = 0;
            if !line.trim().is_empty() {
                let width = indent_width(line);
                while indents.last().map_or(false, |&w| w >= width) {
                    indents.pop();
                }
                indents.push(width);
                if indents.len() > MAX_BLOCK_DEPTH {
                    return true;
                }
            }
        }

        let mut chars = line.chars().peekable();
        let mut word = String::new();
        while let Some(ch) = chars.next() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                if chars.peek().map_or(true, |next| !(next.is_alphanumeric() || *next == '_')) {
                    if CHAINING_WORDS.contains(&word.as_str()) {
                        bump_chain(&mut chains);
                    }
                    word.clear();
                }
                continue;
            }
            match ch {
                '(' | '[' | '{' => {
                    // A bracket group is one operand of the enclosing chain.
                    bump_chain(&mut chains);
                    chains.push(0);
                }
                ')' | ']' | '}' => {
                    if chains.len() > 1 {
                        chains.pop();
                    }
                }
                ',' => {
                    if let Some(top) = chains.last_mut() {
                        *top = 0;
                    }
                }
                '.' => {
                    if chars.peek().map_or(false, |next| next.is_alphabetic() || *next == '_') {
                        bump_chain(&mut chains);
                    }
                }
                '+' | '-' | '*' | '/' | '%' | '@' | '&' | '|' | '^' | '~' | '<' | '>' => bump_chain(&mut chains),
                _ => {}
            }
            if chains.len() + chains.iter().sum::<usize>() > MAX_EXPR_DEPTH {
                return true;
            }
        }
        if chains.len() + chains.iter().sum::<usize>() > MAX_EXPR_DEPTH {
            return true;
        }
    }
    false
}

fn bump_chain(chains: &mut [usize]) {
    if let Some(top) = chains.last_mut() {
        *top += 1;
    }
}

/// Parses `code` as a Python module and extracts its features.
pub fn extract(code: &str) -> Result<FeatureVector, ParseError> {
    let module = parse(code, Mode::Module, "<snippet>")?;
    let line_index = LineIndex::new(code);
    let mut visitor = FeatureVisitor::new(&line_index);

    if let ast::Mod::Module(module) = &module {
        for stmt in &module.body {
            visitor.visit_stmt(stmt);
        }
    }

    Ok(visitor.finish(code))
}

/// Dotted name of a call target, e.g. `os.path.exists` or `len`.
fn call_name(func: &Expr) -> Option<String> {
    match func {
        Expr::Name(node) => Some(node.id.to_string()),
        Expr::Attribute(node) => {
            let base = call_name(&node.value)?;
            Some(format!("{}.{}", base, node.attr))
        }
        _ => None,
    }
}

fn is_name(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Name(node) if node.id.as_str() == name)
}

fn is_string_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Constant(node) => matches!(node.value, ast::Constant::Str(_)),
        Expr::JoinedStr(_) => true,
        _ => false,
    }
}

fn is_number_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Constant(node) => matches!(
            node.value,
            ast::Constant::Int(_) | ast::Constant::Float(_) | ast::Constant::Complex { .. }
        ),
        _ => false,
    }
}

/// `range(len(x))` or `range(0, len(x))`.
fn is_index_iteration(iter: &Expr) -> bool {
    let Expr::Call(call) = iter else {
        return false;
    };
    if !is_name(&call.func, "range") {
        return false;
    }
    let len_arg = match call.args.as_slice() {
        [only] => only,
        [start, stop] if is_zero(start) => stop,
        _ => return false,
    };
    matches!(len_arg, Expr::Call(inner) if is_name(&inner.func, "len"))
}

fn is_zero(expr: &Expr) -> bool {
    match expr {
        Expr::Constant(node) => match &node.value {
            ast::Constant::Int(value) => value.to_string() == "0",
            _ => false,
        },
        _ => false,
    }
}

fn collect_target_names(target: &Expr, names: &mut HashSet<String>) {
    match target {
        Expr::Name(node) => {
            names.insert(node.id.to_string());
        }
        Expr::Tuple(node) => {
            for elt in &node.elts {
                collect_target_names(elt, names);
            }
        }
        Expr::List(node) => {
            for elt in &node.elts {
                collect_target_names(elt, names);
            }
        }
        Expr::Starred(node) => collect_target_names(&node.value, names),
        Expr::Subscript(node) => collect_target_names(&node.value, names),
        Expr::Attribute(node) => collect_target_names(&node.value, names),
        _ => {}
    }
}

/// Names assigned, deleted, or used as a method receiver anywhere in `body`.
fn rebound_names(body: &[Stmt]) -> HashSet<String> {
    let mut names = HashSet::new();
    for stmt in body {
        collect_rebound_stmt(stmt, &mut names);
    }
    names
}

fn collect_rebound_stmt(stmt: &Stmt, names: &mut HashSet<String>) {
    match stmt {
        Stmt::Assign(node) => {
            for target in &node.targets {
                collect_target_names(target, names);
            }
            collect_receivers(&node.value, names);
        }
        Stmt::AugAssign(node) => {
            collect_target_names(&node.target, names);
            collect_receivers(&node.value, names);
        }
        Stmt::AnnAssign(node) => {
            collect_target_names(&node.target, names);
            if let Some(value) = &node.value {
                collect_receivers(value, names);
            }
        }
        Stmt::Delete(node) => {
            for target in &node.targets {
                collect_target_names(target, names);
            }
        }
        Stmt::Expr(node) => collect_receivers(&node.value, names),
        Stmt::Return(node) => {
            if let Some(value) = &node.value {
                collect_receivers(value, names);
            }
        }
        Stmt::For(node) => {
            collect_target_names(&node.target, names);
            collect_receivers(&node.iter, names);
            for inner in node.body.iter().chain(&node.orelse) {
                collect_rebound_stmt(inner, names);
            }
        }
        Stmt::AsyncFor(node) => {
            collect_target_names(&node.target, names);
            collect_receivers(&node.iter, names);
            for inner in node.body.iter().chain(&node.orelse) {
                collect_rebound_stmt(inner, names);
            }
        }
        Stmt::While(node) => {
            collect_receivers(&node.test, names);
            for inner in node.body.iter().chain(&node.orelse) {
                collect_rebound_stmt(inner, names);
            }
        }
        Stmt::If(node) => {
            collect_receivers(&node.test, names);
            for inner in node.body.iter().chain(&node.orelse) {
                collect_rebound_stmt(inner, names);
            }
        }
        Stmt::With(node) => {
            for item in &node.items {
                if let Some(vars) = &item.optional_vars {
                    collect_target_names(vars, names);
                }
            }
            for inner in &node.body {
                collect_rebound_stmt(inner, names);
            }
        }
        Stmt::Try(node) => {
            for inner in node.body.iter().chain(&node.orelse).chain(&node.finalbody) {
                collect_rebound_stmt(inner, names);
            }
            for handler in &node.handlers {
                let ast::ExceptHandler::ExceptHandler(handler_node) = handler;
                for inner in &handler_node.body {
                    collect_rebound_stmt(inner, names);
                }
            }
        }
        _ => {}
    }
}

/// Records `x` for every `x.method(...)` call and walrus target in `expr`.
fn collect_receivers(expr: &Expr, names: &mut HashSet<String>) {
    match expr {
        Expr::Call(node) => {
            if let Expr::Attribute(attr) = &*node.func {
                if let Expr::Name(receiver) = &*attr.value {
                    names.insert(receiver.id.to_string());
                }
            }
        }
        Expr::NamedExpr(node) => collect_target_names(&node.target, names),
        _ => {}
    }
    for child in child_exprs(expr) {
        collect_receivers(child, names);
    }
}

/// Direct sub-expressions of `expr`.
fn child_exprs(expr: &Expr) -> Vec<&Expr> {
    let mut children: Vec<&Expr> = Vec::new();
    match expr {
        Expr::BoolOp(node) => children.extend(node.values.iter()),
        Expr::NamedExpr(node) => {
            children.push(&node.target);
            children.push(&node.value);
        }
        Expr::BinOp(node) => {
            children.push(&node.left);
            children.push(&node.right);
        }
        Expr::UnaryOp(node) => children.push(&node.operand),
        Expr::Lambda(node) => children.push(&node.body),
        Expr::IfExp(node) => {
            children.push(&node.test);
            children.push(&node.body);
            children.push(&node.orelse);
        }
        Expr::Dict(node) => {
            children.extend(node.keys.iter().flatten());
            children.extend(node.values.iter());
        }
        Expr::Set(node) => children.extend(node.elts.iter()),
        Expr::ListComp(node) => {
            children.push(&node.elt);
            push_generators(&node.generators, &mut children);
        }
        Expr::SetComp(node) => {
            children.push(&node.elt);
            push_generators(&node.generators, &mut children);
        }
        Expr::DictComp(node) => {
            children.push(&node.key);
            children.push(&node.value);
            push_generators(&node.generators, &mut children);
        }
        Expr::GeneratorExp(node) => {
            children.push(&node.elt);
            push_generators(&node.generators, &mut children);
        }
        Expr::Await(node) => children.push(&node.value),
        Expr::Yield(node) => {
            if let Some(value) = &node.value {
                children.push(value);
            }
        }
        Expr::YieldFrom(node) => children.push(&node.value),
        Expr::Compare(node) => {
            children.push(&node.left);
            children.extend(node.comparators.iter());
        }
        Expr::Call(node) => {
            children.push(&node.func);
            children.extend(node.args.iter());
            children.extend(node.keywords.iter().map(|keyword| &keyword.value));
        }
        Expr::FormattedValue(node) => children.push(&node.value),
        Expr::JoinedStr(node) => children.extend(node.values.iter()),
        Expr::Attribute(node) => children.push(&node.value),
        Expr::Subscript(node) => {
            children.push(&node.value);
            children.push(&node.slice);
        }
        Expr::Starred(node) => children.push(&node.value),
        Expr::List(node) => children.extend(node.elts.iter()),
        Expr::Tuple(node) => children.extend(node.elts.iter()),
        Expr::Slice(node) => {
            for bound in [&node.lower, &node.upper, &node.step].into_iter().flatten() {
                children.push(bound);
            }
        }
        _ => {}
    }
    children
}

fn push_generators<'e>(generators: &'e [ast::Comprehension], children: &mut Vec<&'e Expr>) {
    for generator in generators {
        children.push(&generator.iter);
        children.extend(generator.ifs.iter());
    }
}
