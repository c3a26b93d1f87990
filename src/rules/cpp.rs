use super::{PatternRule, Relief, Severity, Trigger};
use crate::features::{FeatureVector, Signal};

fn endl_in_loop(features: &FeatureVector, code: &str) -> bool {
    features.get(Signal::PrintInLoopCount) > 0.0 && code.contains("endl")
}

/// Growing a vector in a loop without ever reserving its capacity.
fn push_without_reserve(features: &FeatureVector, code: &str) -> bool {
    features.get(Signal::AppendInLoopCount) > 0.0 && !code.contains(".reserve(")
}

pub static RULES: &[PatternRule] = &[
    PatternRule {
        id: "quadratic-iteration",
        title: "Nested loops make this code quadratic in the input size",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 2.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (const auto& a : items)\n    for (const auto& b : items)\n        if (a == b) matches.push_back(a);",
        after: "std::unordered_set<T> seen(items.begin(), items.end());\nfor (const auto& a : items)\n    if (seen.count(a)) matches.push_back(a);",
        explanation: "Each extra nesting level multiplies the work by the input size. A hash set lookup replaces the inner scan.",
    },
    PatternRule {
        id: "cubic-iteration",
        title: "Three or more nested loops",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 3.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for (int i = 0; i < n; ++i)\n    for (int j = 0; j < n; ++j)\n        for (int k = 0; k < n; ++k)\n            c[i][j] += a[i][k] * b[k][j];",
        after: "for (int i = 0; i < n; ++i)\n    for (int k = 0; k < n; ++k)\n        for (int j = 0; j < n; ++j)\n            c[i][j] += a[i][k] * b[k][j];",
        explanation: "Cubic loops dominate runtime. The i-k-j order walks memory sequentially and lets the compiler vectorise the inner loop.",
    },
    PatternRule {
        id: "alloc-in-loop",
        title: "Heap allocation on every iteration",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::AllocInLoopCount, 0.0),
        relief: Relief::zero(Signal::AllocInLoopCount),
        before: "for (int i = 0; i < n; ++i) {\n    int* buf = new int[size];\n    fill(buf, size);\n    delete[] buf;\n}",
        after: "std::vector<int> buf(size);\nfor (int i = 0; i < n; ++i) {\n    fill(buf.data(), size);\n}",
        explanation: "new/malloc per iteration pays allocator cost and fragments the heap. Allocate once and reuse.",
    },
    PatternRule {
        id: "append-in-loop",
        title: "push_back in a loop without reserve()",
        severity: Severity::Medium,
        trigger: Trigger::Custom(push_without_reserve),
        relief: Relief::zero(Signal::AppendInLoopCount),
        before: "std::vector<int> out;\nfor (int x : data) out.push_back(x * 2);",
        after: "std::vector<int> out;\nout.reserve(data.size());\nfor (int x : data) out.push_back(x * 2);",
        explanation: "Without reserve the vector reallocates and copies its contents each time it runs out of capacity.",
    },
    PatternRule {
        id: "invariant-call-in-loop",
        title: "strlen() or size() recomputed in the loop condition",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::InvariantCallInLoopCount, 0.0),
        relief: Relief::zero(Signal::InvariantCallInLoopCount),
        before: "for (size_t i = 0; i < strlen(s); ++i) { /* ... */ }",
        after: "const size_t len = strlen(s);\nfor (size_t i = 0; i < len; ++i) { /* ... */ }",
        explanation: "strlen walks the whole string, turning a linear loop quadratic. Compute the bound once.",
    },
    PatternRule {
        id: "endl-in-loop",
        title: "std::endl flushes the stream on every iteration",
        severity: Severity::Medium,
        trigger: Trigger::Custom(endl_in_loop),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for (const auto& line : lines)\n    std::cout << line << std::endl;",
        after: "for (const auto& line : lines)\n    std::cout << line << '\\n';",
        explanation: "endl forces a flush, which is a system call. A plain newline lets the stream buffer.",
    },
    PatternRule {
        id: "io-in-loop",
        title: "Console or file I/O inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::IoInLoopCount, 0.0),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for (int i = 0; i < n; ++i) printf(\"%d\\n\", v[i]);",
        after: "std::string out;\nfor (int i = 0; i < n; ++i) out += std::to_string(v[i]) + '\\n';\nfwrite(out.data(), 1, out.size(), stdout);",
        explanation: "Formatting and writing per iteration is dominated by call overhead. Buffer and write once.",
    },
    PatternRule {
        id: "recursive-call",
        title: "Recursive function without memoisation",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::RecursionCount, 0.0),
        relief: Relief::zero(Signal::RecursionCount),
        before: "long fib(int n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }",
        after: "long fib(int n) {\n    long a = 0, b = 1;\n    while (n-- > 0) { long t = a + b; a = b; b = t; }\n    return a;\n}",
        explanation: "Repeated subproblems make naive recursion exponential. Iterate or memoise.",
    },
];
