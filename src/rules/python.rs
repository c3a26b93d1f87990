use super::{PatternRule, Relief, Severity, Trigger};
use crate::features::{FeatureVector, Signal};

/// In-loop I/O other than console output.
fn io_in_loop_not_print(features: &FeatureVector, _code: &str) -> bool {
    features.get(Signal::IoInLoopCount) > features.get(Signal::PrintInLoopCount)
}

pub static RULES: &[PatternRule] = &[
    PatternRule {
        id: "quadratic-iteration",
        title: "Nested loops make this code quadratic in the input size",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 2.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for a in items:\n    for b in items:\n        if a == b:\n            matches.append(a)",
        after: "seen = set(items)\nmatches = [a for a in items if a in seen]",
        explanation: "Each extra nesting level multiplies the work by the input size. A set or dict lookup turns the inner scan into a constant-time membership test.",
    },
    PatternRule {
        id: "cubic-iteration",
        title: "Three or more nested loops",
        severity: Severity::High,
        trigger: Trigger::AtLeast(Signal::NestedLoopDepth, 3.0),
        relief: Relief::halve(Signal::NestedLoopDepth),
        before: "for i in range(n):\n    for j in range(n):\n        for k in range(n):\n            c[i][j] += a[i][k] * b[k][j]",
        after: "import numpy as np\nc = np.asarray(a) @ np.asarray(b)",
        explanation: "Cubic loops dominate runtime for any real input. Vectorised libraries run the same arithmetic in optimised native code.",
    },
    PatternRule {
        id: "string-concat-in-loop",
        title: "String built with += inside a loop",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::StringConcatInLoopCount, 0.0),
        relief: Relief::zero(Signal::StringConcatInLoopCount),
        before: "result = \"\"\nfor i in range(len(items)):\n    result += items[i]",
        after: "result = \"\".join(items)",
        explanation: "Strings are immutable, so every += copies the whole string built so far. str.join sizes the result once.",
    },
    PatternRule {
        id: "await-in-loop",
        title: "Awaiting inside a loop serialises independent work",
        severity: Severity::High,
        trigger: Trigger::Above(Signal::AwaitInLoopCount, 0.0),
        relief: Relief::zero(Signal::AwaitInLoopCount),
        before: "for url in urls:\n    pages.append(await fetch(url))",
        after: "pages = await asyncio.gather(*(fetch(url) for url in urls))",
        explanation: "Each iteration waits for the previous one. asyncio.gather runs the awaits concurrently and keeps the CPU idle for less time.",
    },
    PatternRule {
        id: "io-in-loop",
        title: "File or network I/O inside a loop",
        severity: Severity::Medium,
        trigger: Trigger::Custom(io_in_loop_not_print),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for line in lines:\n    with open(path, \"a\") as f:\n        f.write(line)",
        after: "with open(path, \"a\") as f:\n    f.writelines(lines)",
        explanation: "Opening files or sockets per iteration pays system-call and latency costs every time. Batch the I/O outside the loop.",
    },
    PatternRule {
        id: "print-in-loop",
        title: "print() called on every iteration",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::PrintInLoopCount, 0.0),
        relief: Relief::zero(Signal::IoInLoopCount),
        before: "for row in rows:\n    print(row)",
        after: "print(\"\\n\".join(map(str, rows)))",
        explanation: "Every print is a write to the terminal. Building the output once and writing it in one call is far cheaper.",
    },
    PatternRule {
        id: "index-based-iteration",
        title: "Looping over range(len(...)) instead of the sequence",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::IndexIterationCount, 0.0),
        relief: Relief::zero(Signal::IndexIterationCount),
        before: "for i in range(len(items)):\n    process(items[i])",
        after: "for item in items:\n    process(item)",
        explanation: "Indexing does a bounds-checked lookup per element. Iterating directly (or with enumerate) avoids it.",
    },
    PatternRule {
        id: "append-in-loop",
        title: "List built by calling append in a loop",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::AppendInLoopCount, 0.0),
        relief: Relief::zero(Signal::AppendInLoopCount),
        before: "result = []\nfor x in data:\n    result.append(x * 2)",
        after: "result = [x * 2 for x in data]",
        explanation: "A comprehension avoids the attribute lookup and method call per element and lets the list grow in fewer steps.",
    },
    PatternRule {
        id: "manual-accumulation",
        title: "Hand-written summing loop",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::ManualAccumulationCount, 0.0),
        relief: Relief::zero(Signal::ManualAccumulationCount),
        before: "total = 0\nfor x in values:\n    total += x",
        after: "total = sum(values)",
        explanation: "Builtins such as sum run their loop in C instead of dispatching bytecode for every element.",
    },
    PatternRule {
        id: "invariant-call-in-loop",
        title: "Loop-invariant call re-evaluated every iteration",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::InvariantCallInLoopCount, 0.0),
        relief: Relief::zero(Signal::InvariantCallInLoopCount),
        before: "while i < len(items):\n    i += 1",
        after: "n = len(items)\nwhile i < n:\n    i += 1",
        explanation: "The result does not change inside the loop. Compute it once before the loop starts.",
    },
    PatternRule {
        id: "alloc-in-loop",
        title: "New containers allocated on every iteration",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::AllocInLoopCount, 0.0),
        relief: Relief::zero(Signal::AllocInLoopCount),
        before: "for x in data:\n    buf = []\n    buf.extend(x)\n    use(buf)",
        after: "buf = []\nfor x in data:\n    buf.clear()\n    buf.extend(x)\n    use(buf)",
        explanation: "Allocating per iteration churns the allocator and the garbage collector. Reuse one buffer where the data allows it.",
    },
    PatternRule {
        id: "recursive-call",
        title: "Recursive function without memoisation",
        severity: Severity::Medium,
        trigger: Trigger::Above(Signal::RecursionCount, 0.0),
        relief: Relief::zero(Signal::RecursionCount),
        before: "def fib(n):\n    if n < 2:\n        return n\n    return fib(n - 1) + fib(n - 2)",
        after: "from functools import lru_cache\n\n@lru_cache(maxsize=None)\ndef fib(n):\n    if n < 2:\n        return n\n    return fib(n - 1) + fib(n - 2)",
        explanation: "Recursion that revisits the same arguments repeats work exponentially. Caching results or iterating removes the repetition.",
    },
    PatternRule {
        id: "wildcard-import",
        title: "Wildcard import loads the whole module namespace",
        severity: Severity::Low,
        trigger: Trigger::Above(Signal::WildcardImportCount, 0.0),
        relief: Relief::zero(Signal::WildcardImportCount),
        before: "from os.path import *",
        after: "from os.path import join, exists",
        explanation: "Importing only the names you use keeps module setup and lookups small.",
    },
];
