use super::{PatternRule, Relief, Severity, Trigger};
use crate::features::{FeatureVector, Signal};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOXED_ACCUMULATOR: Regex = Regex::new(r"\b(?:Integer|Long|Double|Float)\s+\w+\s*=").unwrap();
}

/// A summing loop over a boxed accumulator unboxes and reboxes every step.
fn boxed_accumulation(features: &FeatureVector, code: &str) -> bool {
    features.get(Signal::ManualAccumulationCount) > 0.0 && BOXED_ACCUMULATOR.is_match(code)
}

pub static RULES: &[PatternRule] = &[
    PatternRule {
        id: "quadratic-iteration",
        title: "Nested loops make this code quadratic in the input size",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 2.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (String a : items) {\n    for (String b : items) {\n        if (a.equals(b)) matches.add(a);\n    }\n}",
        after: "Set<String> seen = new HashSet<>(items);\nfor (String a : items) {\n    if (seen.contains(a)) matches.add(a);\n}",
        explanation: "Each extra nesting level multiplies the work by the input size. A HashSet lookup replaces the inner scan.",
    },
    PatternRule {
        id: "cubic-iteration",
        title: "Three or more nested loops",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 3.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (int i = 0; i < n; i++)\n    for (int j = 0; j < n; j++)\n        for (int k = 0; k < n; k++)\n            c[i][j] += a[i][k] * b[k][j];",
        after: "// reorder to i-k-j so the innermost loop walks memory sequentially,\n// or hand the product to a BLAS-backed library",
        explanation: "Cubic loops dominate runtime. At minimum keep the innermost loop cache friendly.",
    },
    PatternRule {
        id: "string-concat-in-loop",
        title: "String concatenated with + inside a loop",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::StringConcatInLoopCount, 0.0),
        relief: Relief::zero(Signal::StringConcatInLoopCount),
        before: "String s = \"\";\nfor (int i = 0; i < items.length; i++) {\n    s += items[i];\n}",
        after: "StringBuilder sb = new StringBuilder();\nfor (String item : items) {\n    sb.append(item);\n}\nString s = sb.toString();",
        explanation: "Strings are immutable, so each += allocates and copies a new String. StringBuilder appends into one growing buffer.",
    },
    PatternRule {
        id: "alloc-in-loop",
        title: "Objects allocated on every iteration",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::AllocInLoopCount, 0.0),
        relief: Relief::zero(Signal::AllocInLoopCount),
        before: "for (Row row : rows) {\n    SimpleDateFormat fmt = new SimpleDateFormat(\"yyyy-MM-dd\");\n    out.add(fmt.format(row.date()));\n}",
        after: "DateTimeFormatter fmt = DateTimeFormatter.ISO_LOCAL_DATE;\nfor (Row row : rows) {\n    out.add(fmt.format(row.date()));\n}",
        explanation: "Allocation in a hot loop raises GC pressure. Hoist objects that do not depend on the iteration.",
    },
    PatternRule {
        id: "io-in-loop",
        title: "Console, file or database I/O inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::IoInLoopCount, 0.0),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for (String line : lines) {\n    System.out.println(line);\n}",
        after: "System.out.println(String.join(System.lineSeparator(), lines));",
        explanation: "Each println synchronises on the stream and flushes. Batch output or use a buffered writer.",
    },
    PatternRule {
        id: "await-in-loop",
        title: "Blocking on a future inside a loop",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::AwaitInLoopCount, 0.0),
        relief: Relief::zero(Signal::AwaitInLoopCount),
        before: "for (CompletableFuture<R> f : futures) {\n    results.add(f.join());\n}",
        after: "CompletableFuture.allOf(futures.toArray(new CompletableFuture[0])).join();\nfutures.forEach(f -> results.add(f.join()));",
        explanation: "Joining one future at a time serialises the waits. allOf waits for all of them together.",
    },
    PatternRule {
        id: "invariant-call-in-loop",
        title: "size() or length() re-evaluated in the loop condition",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::InvariantCallInLoopCount, 0.0),
        relief: Relief::zero(Signal::InvariantCallInLoopCount),
        before: "for (int i = 0; i < list.size(); i++) { /* ... */ }",
        after: "for (int i = 0, n = list.size(); i < n; i++) { /* ... */ }",
        explanation: "The condition is evaluated every iteration. Cache the bound when the collection does not change.",
    },
    PatternRule {
        id: "boxed-accumulation",
        title: "Accumulating into a boxed number",
        severity: Severity::Medium,
        trigger: Trigger::Custom(boxed_accumulation),
        relief: Relief::zero(Signal::ManualAccumulationCount),
        before: "Long total = 0L;\nfor (long v : values) {\n    total += v;\n}",
        after: "long total = 0L;\nfor (long v : values) {\n    total += v;\n}",
        explanation: "Each += on a wrapper type unboxes, adds and allocates a new wrapper. Use the primitive type.",
    },
    PatternRule {
        id: "recursive-call",
        title: "Recursive method without memoisation",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::RecursionCount, 0.0),
        relief: Relief::zero(Signal::RecursionCount),
        before: "long fib(int n) {\n    return n < 2 ? n : fib(n - 1) + fib(n - 2);\n}",
        after: "long fib(int n) {\n    long a = 0, b = 1;\n    for (int i = 0; i < n; i++) { long t = a + b; a = b; b = t; }\n    return a;\n}",
        explanation: "Naive recursion repeats subproblems and grows the stack. An iterative or memoised version does each step once.",
    },
    PatternRule {
        id: "wildcard-import",
        title: "Wildcard import",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::WildcardImportCount, 0.0),
        relief: Relief::zero(Signal::WildcardImportCount),
        before: "import java.util.*;",
        after: "import java.util.List;\nimport java.util.Map;",
        explanation: "Explicit imports keep compilation and class resolution focused on what is used.",
    },
];
